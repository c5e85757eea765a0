use super::*;
use crate::request::Pagination;

fn columns() -> ReportColumns {
    ReportColumns::new()
        .required(["hallId"])
        .default_columns(["ip", "device"])
        .all(["hallId", "ip", "device", "countryCode"])
        .sortable(["hallId", "countryCode"])
}

#[test]
fn test_show_column_rules() {
    let columns = columns();

    let nothing_requested = ReportRequest::default();
    assert!(columns.is_need_show_column("hallId", &nothing_requested));
    assert!(columns.is_need_show_column("ip", &nothing_requested));
    assert!(!columns.is_need_show_column("countryCode", &nothing_requested));

    let requested = ReportRequest::default().with_show_columns(["countryCode"]);
    assert!(columns.is_need_show_column("countryCode", &requested));
    assert!(columns.is_need_show_column("hallId", &requested));
    assert!(!columns.is_need_show_column("ip", &requested));
}

#[test]
fn test_sort_column_rules() {
    let columns = columns();
    let request = ReportRequest::default().with_sort(["-countryCode", "ip"]);

    assert!(columns.is_need_sort_column("countryCode", &request));
    assert!(columns.is_need_sort_column("-countryCode", &request));
    // requested but not sortable
    assert!(!columns.is_need_sort_column("ip", &request));
    // sortable but not requested
    assert!(!columns.is_need_sort_column("hallId", &request));
}

#[test]
fn test_sort_list() {
    let columns = columns();
    let request = ReportRequest::default().with_sort(["-countryCode", "ip", "hallId"]);
    assert_eq!(
        columns.sort_list(&request),
        vec!["countryCode DESC", "hallId ASC"]
    );
}

#[test]
fn test_pagination_parameters() {
    let columns = columns();
    let page = |page, per_page| {
        columns
            .pagination_parameters(&ReportRequest::default().with_pagination(page, per_page))
            .unwrap()
    };

    assert_eq!(
        columns
            .pagination_parameters(&ReportRequest::default())
            .unwrap(),
        (20, 0)
    );
    assert_eq!(page(3, 50), (50, 100));
    assert_eq!(page(1, 0), (ITEMS_COUNT_DEFAULT, 0));
    assert_eq!(page(2, -5), (ITEMS_COUNT_DEFAULT, ITEMS_COUNT_DEFAULT));
    assert_eq!(page(2, 5000), (ITEMS_COUNT_MAX, ITEMS_COUNT_MAX));
    assert_eq!(page(0, 10), (10, 0));
    assert_eq!(page(-3, 10), (10, 0));
    assert_eq!(page(i64::MIN, 10), (10, 0));
    assert_eq!(Pagination::default(), Pagination { page: 1, per_page: 20 });
}

#[test]
fn test_pagination_offset_overflow_is_rejected() {
    let columns = columns();
    let request = ReportRequest::default().with_pagination(i64::MAX, 1000);
    let err = columns.pagination_parameters(&request).unwrap_err();
    assert!(matches!(err, ReportError::InvalidRequest(_)));
    assert!(err.to_string().contains("out of range"));

    // largest page whose offset still fits
    let last = (u64::MAX / 1000 + 1) as i64;
    let request = ReportRequest::default().with_pagination(last, 1000);
    assert_eq!(
        columns.pagination_parameters(&request).unwrap(),
        (1000, 1000 * (last as u64 - 1))
    );
}

struct Empty {
    name: &'static str,
    columns: ReportColumns,
}

impl Report for Empty {
    fn name(&self) -> &str {
        self.name
    }

    fn columns(&self) -> &ReportColumns {
        &self.columns
    }

    fn prepare(
        &self,
        builder: &mut ReportQueryBuilder,
        _request: &ReportRequest,
    ) -> ReportResult<()> {
        builder.set_from("numbers");
        builder.add_select("*");
        Ok(())
    }
}

#[test]
fn test_registry_lookup() {
    let mut registry = ReportRegistry::new();
    registry.register(Box::new(Empty {
        name: "sessions",
        columns: ReportColumns::new(),
    }));
    registry.register(Box::new(Empty {
        name: "bets",
        columns: ReportColumns::new(),
    }));

    assert_eq!(registry.names(), vec!["bets", "sessions"]);
    assert_eq!(registry.get("sessions").unwrap().name(), "sessions");

    let err = registry.get("payments").err().unwrap();
    assert!(matches!(err, ReportError::NotFound(ref name) if name == "payments"));
    assert_eq!(err.to_string(), "[R001] Report type `payments` is not found.");
}
