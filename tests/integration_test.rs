use json_api_request::{
    Config, DataSource, Error, FilterValue, JsonApiRequest, JsonApiRequestBuilder, ParameterKind,
    RawParams, RawValue, RequestInput, SortDirection,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Request with default allow-lists for every parameter kind.
fn example_request(params: RawParams) -> JsonApiRequestBuilder<RawParams> {
    JsonApiRequest::builder(params)
        .default_table("example_table")
        .allowed_filters_provider(|| ["id", "name", "email"])
        .allowed_fields_provider(|| {
            [
                "id",
                "name",
                "email",
                "is_admin",
                "created_at",
                "updated_at",
                "another_table.title",
                "another_table.content",
                "another_table.created_at",
            ]
        })
        .allowed_sorts_provider(|| ["id", "name", "created_at", "updated_at"])
        .allowed_includes_provider(|| ["friends", "roles"])
        .allowed_appends_provider(|| ["full_name", "another_attribute"])
}

fn sort_pairs(request: &mut JsonApiRequest) -> Vec<(String, SortDirection)> {
    request
        .sorts()
        .unwrap()
        .iter()
        .map(|s| (s.field().to_string(), s.direction()))
        .collect()
}

#[test]
fn includes_are_split_filtered_and_deduplicated() {
    init_tracing();
    let params = RawParams::new().with("include", "fooBarBaz,bar,fooBarBaz,0,foo_bar");
    let mut request = JsonApiRequest::new(params);

    assert_eq!(request.includes().unwrap(), ["fooBarBaz", "bar", "foo_bar"]);
}

#[test]
fn include_list_drops_falsy_values() {
    let params = RawParams::new().with(
        "include",
        RawValue::List(vec![
            "fooBarBaz".into(),
            "bar".into(),
            RawValue::Null,
            false.into(),
            "fooBarBaz".into(),
            "".into(),
            "foo_bar".into(),
            "0".into(),
        ]),
    );
    let mut request = JsonApiRequest::new(params);

    assert_eq!(request.includes().unwrap(), ["fooBarBaz", "bar", "foo_bar"]);
}

#[test]
fn allowed_includes_accept_a_subset() {
    let params = RawParams::new().with("include", "fooBarBaz,bar,0,bar,foo_bar");
    let mut request = JsonApiRequest::new(params);

    request
        .set_allowed_includes(["fooBarBaz", "bar", "foo_bar", "bar_baz"])
        .unwrap();
    assert_eq!(request.includes().unwrap(), ["fooBarBaz", "bar", "foo_bar"]);
}

#[test]
fn unknown_include_is_rejected_with_details() {
    let params = RawParams::new().with("include", "fooBarBaz,bar,foo_bar,bar_baz");
    let mut request = JsonApiRequest::new(params);

    let err = request
        .set_allowed_includes(["fooBarBaz", "bar", "bar_baz"])
        .unwrap_err();

    assert_eq!(err.kind(), Some(ParameterKind::Includes));
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.unknown, ["foo_bar"]);
    assert_eq!(rejection.allowed, ["fooBarBaz", "bar", "bar_baz"]);
    assert!(request.allowed_includes().unwrap().is_none());
}

#[test]
fn appends_follow_the_same_rules() {
    let params = RawParams::new().with("append", "full_name,0,full_name,age");
    let mut request = JsonApiRequest::new(params);

    assert_eq!(request.appends().unwrap(), ["full_name", "age"]);
    assert!(matches!(
        request.set_allowed_appends(["full_name"]),
        Err(Error::InvalidAppendQuery(_))
    ));
    request.set_allowed_appends(["full_name", "age"]).unwrap();
}

#[test]
fn sorts_keep_first_direction_per_field() {
    let params = RawParams::new().with("sort", "fooBarBaz,bar,fooBarBaz,0,-foo_bar");
    let mut request = JsonApiRequest::new(params);

    assert_eq!(
        sort_pairs(&mut request),
        vec![
            ("fooBarBaz".to_string(), SortDirection::Ascending),
            ("bar".to_string(), SortDirection::Ascending),
            ("foo_bar".to_string(), SortDirection::Descending),
        ]
    );
}

#[test]
fn sort_direction_comes_from_prefix() {
    let params = RawParams::new().with("sort", "-name,id");
    let mut request = JsonApiRequest::new(params);

    assert_eq!(
        sort_pairs(&mut request),
        vec![
            ("name".to_string(), SortDirection::Descending),
            ("id".to_string(), SortDirection::Ascending),
        ]
    );
    assert_eq!(request.sorts().unwrap()[0].to_string(), "-name");
}

#[test]
fn indexed_includes_keep_request_order() {
    let params = RawParams::new().with(
        "include",
        RawValue::map((0..11).map(|i| (i.to_string(), format!("rel{i}")))),
    );
    let mut request = JsonApiRequest::new(params);

    let expected: Vec<String> = (0..11).map(|i| format!("rel{i}")).collect();
    assert_eq!(request.includes().unwrap(), expected.as_slice());
}

#[test]
fn indexed_sorts_keep_priority() {
    let params = RawParams::new().with(
        "sort",
        RawValue::map((0..12).map(|i| (i.to_string(), format!("-field{i}")))),
    );
    let mut request = JsonApiRequest::new(params);

    let fields: Vec<String> = request
        .sorts()
        .unwrap()
        .iter()
        .map(|s| s.field().to_string())
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("field{i}")).collect();
    assert_eq!(fields, expected);
}

#[test]
fn json_body_keeps_indexed_order() {
    let body = serde_json::json!({
        "include": { "0": "a", "1": "b", "2": "c", "10": "k" },
    });
    let mut request = JsonApiRequest::new(RawParams::from(body));

    assert_eq!(request.includes().unwrap(), ["a", "b", "c", "k"]);
}

#[test]
fn sort_list_drops_falsy_values() {
    let params = RawParams::new().with(
        "sort",
        RawValue::List(vec![
            "-fooBarBaz".into(),
            "bar".into(),
            RawValue::Null,
            "bar".into(),
            false.into(),
            "fooBarBaz".into(),
            "".into(),
            "foo_bar".into(),
            "0".into(),
        ]),
    );
    let mut request = JsonApiRequest::new(params);

    assert_eq!(
        sort_pairs(&mut request),
        vec![
            ("fooBarBaz".to_string(), SortDirection::Descending),
            ("bar".to_string(), SortDirection::Ascending),
            ("foo_bar".to_string(), SortDirection::Ascending),
        ]
    );
}

#[test]
fn sorts_are_checked_by_field_name() {
    let params = RawParams::new().with("sort", "fooBarBaz,bar,0,-bar,foo_bar");
    let mut request = JsonApiRequest::new(params);

    request
        .set_allowed_sorts(["fooBarBaz", "bar", "foo_bar", "bar_baz"])
        .unwrap();
    assert_eq!(request.sorts().unwrap().len(), 3);

    let params = RawParams::new().with("sort", "fooBarBaz,bar,foo_bar,bar_baz");
    let mut request = JsonApiRequest::new(params);
    let err = request
        .set_allowed_sorts(["fooBarBaz", "bar", "bar_baz"])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSortQuery(_)));
}

#[test]
fn renamed_sort_parameter() {
    let mut config = Config::default();
    config.parameters.sort = "sorts".to_string();

    let params = RawParams::new().with("sorts", "fooBarBaz,-bar,foo_bar,bar_baz");
    let mut request = JsonApiRequest::builder(params).config(config).build();

    assert_eq!(request.sorts().unwrap().len(), 4);
    assert!(request.sorts().unwrap()[1].is_descending());
}

#[test]
fn missing_parameters_yield_empty_results() {
    let mut request = JsonApiRequest::new(RawParams::new());

    assert!(request.includes().unwrap().is_empty());
    assert!(request.appends().unwrap().is_empty());
    assert!(request.sorts().unwrap().is_empty());
    assert!(request.fields().unwrap().is_empty());
    assert!(request.filters().unwrap().is_empty());
}

#[test]
fn fields_are_grouped_by_table() {
    let params = RawParams::new().with(
        "fields",
        RawValue::map([
            ("default_table_name", "name,email,phone_number,email"),
            ("another_table", "title,content,created_at"),
        ]),
    );
    let mut request = JsonApiRequest::builder(params)
        .default_table("default_table_name")
        .build();

    request
        .set_allowed_fields([
            "name",
            "email",
            "phone_number",
            "another_table.title",
            "another_table.content",
            "another_table.created_at",
        ])
        .unwrap();

    let fields = request.fields().unwrap();
    assert_eq!(fields["default_table_name"], ["name", "email", "phone_number"]);
    assert_eq!(fields["another_table"], ["title", "content", "created_at"]);
}

#[test]
fn unknown_field_is_rejected() {
    let params = RawParams::new().with(
        "fields",
        RawValue::map([("default_table_name", "name,email,is_admin")]),
    );
    let mut request = JsonApiRequest::builder(params)
        .default_table("default_table_name")
        .build();

    let err = request.set_allowed_fields(["name", "email"]).unwrap_err();
    assert!(matches!(err, Error::InvalidFieldQuery(_)));
    assert_eq!(
        err.rejection().unwrap().unknown,
        ["default_table_name.is_admin"]
    );
}

#[test]
fn filters_are_coerced() {
    let params = RawParams::new().with(
        "filter",
        RawValue::map([
            ("foo", RawValue::from("bar,baz")),
            ("active", RawValue::from("true")),
            ("deleted", RawValue::from("false")),
            ("count", RawValue::from("0")),
            (
                "nested",
                RawValue::map([("first", RawValue::from("x")), ("second", RawValue::Null)]),
            ),
        ]),
    );
    let mut request = JsonApiRequest::new(params);

    let filters = request.filters().unwrap();
    assert_eq!(filters["foo"], FilterValue::from(vec!["bar", "baz"]));
    assert_eq!(filters["active"], FilterValue::Bool(true));
    assert_eq!(filters["deleted"], FilterValue::Bool(false));
    assert_eq!(filters["count"], FilterValue::from("0"));

    let nested = filters["nested"].as_map().unwrap();
    assert_eq!(nested["first"].as_str(), Some("x"));
    assert_eq!(nested["second"].as_str(), Some(""));
}

#[test]
fn unknown_filter_respects_configuration() {
    let params = || RawParams::new().with("filter", RawValue::map([("secret", "x"), ("id", "1")]));

    let mut strict = JsonApiRequest::new(params());
    assert!(matches!(
        strict.set_allowed_filters(["id"]),
        Err(Error::InvalidFilterQuery(_))
    ));

    let config = Config {
        disable_invalid_filter_query_exception: true,
        ..Config::default()
    };
    let mut lenient = JsonApiRequest::builder(params()).config(config).build();
    lenient.set_allowed_filters(["id"]).unwrap();
    assert_eq!(lenient.filters().unwrap().len(), 2);
}

#[test]
fn filter_list_is_validated_by_index() {
    let params = RawParams::new().with("filter", RawValue::from(vec!["secret"]));
    let mut request = JsonApiRequest::new(params);

    let err = request.set_allowed_filters(["id"]).unwrap_err();
    assert!(matches!(err, Error::InvalidFilterQuery(_)));
    assert_eq!(err.rejection().unwrap().unknown, ["0"]);
}

#[test]
fn body_data_source() {
    let mut input = RequestInput::new();
    input.add_query_param("sort", "-query");
    input.add_body_param("sort", "-body");

    let config = Config {
        request_data_source: DataSource::Body,
        ..Config::default()
    };
    let mut request = JsonApiRequest::builder(input).config(config).build();

    assert_eq!(request.sorts().unwrap()[0].field(), "body");
}

#[test]
fn json_body_round_trips_through_raw_params() {
    let body = serde_json::json!({
        "include": ["roles", "friends"],
        "filter": { "ids": [1, 2], "active": true },
    });
    let mut request = JsonApiRequest::new(RawParams::from(body));

    assert_eq!(request.includes().unwrap(), ["roles", "friends"]);
    let filters = request.filters().unwrap();
    assert_eq!(
        filters["ids"],
        FilterValue::List(vec![FilterValue::Int(1), FilterValue::Int(2)])
    );
    assert_eq!(filters["active"], FilterValue::Bool(true));
}

#[test]
fn config_deserializes_with_defaults() {
    let config: Config = serde_json::from_value(serde_json::json!({
        "parameters": { "include": "with" },
        "request_data_source": "body",
    }))
    .unwrap();

    assert_eq!(config.parameters.include, "with");
    assert_eq!(config.parameters.sort, "sort");
    assert_eq!(config.request_data_source, DataSource::Body);
    assert!(!config.disable_invalid_filter_query_exception);
}

// Providers

#[test]
fn provider_rejects_unknown_append_on_read() {
    init_tracing();
    let params = RawParams::new().with("append", "full_name,another_attribute,unallowed_attribute");
    let mut request = example_request(params).build();

    assert!(matches!(
        request.appends(),
        Err(Error::InvalidAppendQuery(_))
    ));
}

#[test]
fn provider_rejects_unknown_field_on_read() {
    let params = RawParams::new().with(
        "fields",
        RawValue::map([
            ("example_table", "name,email,phone_number,is_admin"),
            ("another_table", "title,content,created_at"),
        ]),
    );
    let mut request = example_request(params).build();

    let err = request.fields().unwrap_err();
    assert!(matches!(err, Error::InvalidFieldQuery(_)));
    assert_eq!(err.rejection().unwrap().unknown, ["example_table.phone_number"]);
}

#[test]
fn provider_rejects_unknown_filter_on_read() {
    let params = RawParams::new().with(
        "filter",
        RawValue::map([
            ("id", RawValue::Int(1)),
            ("unallowed_field", RawValue::from("unallowed_value")),
        ]),
    );
    let mut request = example_request(params).build();

    assert!(matches!(
        request.filters(),
        Err(Error::InvalidFilterQuery(_))
    ));
}

#[test]
fn provider_rejects_unknown_include_on_read() {
    let params = RawParams::new().with("include", "roles,unallowedIncludes");
    let mut request = example_request(params).build();

    assert!(matches!(
        request.includes(),
        Err(Error::InvalidIncludeQuery(_))
    ));
}

#[test]
fn provider_rejects_unknown_sort_on_read() {
    let params = RawParams::new().with("sort", "id,name,unallowed_query");
    let mut request = example_request(params).build();

    assert!(matches!(request.sorts(), Err(Error::InvalidSortQuery(_))));
}

#[test]
fn provider_allow_lists_pass_valid_requests() {
    let params = RawParams::new()
        .with("include", "roles")
        .with("sort", "-created_at")
        .with("fields", RawValue::map([("another_table", "title")]));
    let mut request = example_request(params).build();

    assert_eq!(request.includes().unwrap(), ["roles"]);
    assert_eq!(request.sorts().unwrap()[0].field(), "created_at");
    assert_eq!(
        request.allowed_fields().unwrap().unwrap().as_slice()[0],
        "example_table.id"
    );
    assert_eq!(request.qualified_fields().unwrap(), ["another_table.title"]);
}

#[test]
fn explicit_allow_list_replaces_provider() {
    let params = RawParams::new().with("include", "permissions");
    let mut request = example_request(params).build();

    request.set_allowed_includes(["permissions"]).unwrap();
    assert_eq!(request.includes().unwrap(), ["permissions"]);
}

#[test]
fn fields_provider_without_default_table() {
    let params = RawParams::new().with(
        "fields",
        RawValue::map([
            ("example_table", "name,email"),
            ("another_table", "title,content,created_at"),
        ]),
    );
    let mut request = JsonApiRequest::builder(params)
        .allowed_fields_provider(|| ["id", "name", "email"])
        .build();

    assert_eq!(request.fields().unwrap_err(), Error::DefaultTableNotDefined);
}
