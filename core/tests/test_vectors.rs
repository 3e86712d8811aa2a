//! Verify URL resolution and response translation against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector names its inputs and the expected URL, error kind or decoded
//! entity, so the same files can drive ports of the client to other hosts.

use redmine_core::types::{Version, VersionStatus};
use redmine_core::{
    ErrorKind, EntityKind, HttpMethod, HttpResponse, MimeFormat, Operation, RedmineError,
    ResponseTranslator, TransportError, TransportOutcome, UrlResolver,
};
use serde_json::Value;

fn str_field<'a>(case: &'a Value, key: &str) -> Option<&'a str> {
    case[key].as_str()
}

fn format_of(case: &Value) -> MimeFormat {
    str_field(case, "format").unwrap().parse().unwrap()
}

fn error_kind_name(kind: ErrorKind) -> String {
    format!("{kind:?}")
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

#[test]
fn url_test_vectors() {
    let raw = include_str!("../../test-vectors/urls.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let host = vectors["host"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name").unwrap();
        let kind: EntityKind = str_field(case, "kind").unwrap().parse().unwrap();
        let owner_id = str_field(case, "owner_id");
        let id = str_field(case, "id").unwrap_or("");
        let operation = match str_field(case, "operation").unwrap() {
            "create" => Operation::Create { owner_id },
            "list" => Operation::List { owner_id },
            "read" => Operation::Read { id },
            "update" => Operation::Update { id },
            "delete" => Operation::Delete { id },
            other => panic!("{name}: unknown operation {other}"),
        };

        let result = UrlResolver::new(host, format_of(case)).resolve(kind, operation);
        match (str_field(case, "expected_url"), str_field(case, "expected_error")) {
            (Some(url), None) => {
                assert_eq!(result.unwrap(), format!("{host}{url}"), "{name}");
            }
            (None, Some(kind)) => {
                let err = result.expect_err(name);
                assert_eq!(error_kind_name(err.kind()), kind, "{name}");
            }
            _ => panic!("{name}: vector needs exactly one expectation"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn outcome_of(case: &Value) -> TransportOutcome {
    let failure = &case["transport_error"];
    if failure.is_object() {
        let message = failure["message"].as_str().unwrap().to_string();
        return Err(match failure["kind"].as_str().unwrap() {
            "timeout" => TransportError::Timeout(message),
            "name_resolution" => TransportError::NameResolution(message),
            _ => TransportError::Other(message),
        });
    }
    let status = case["status"].as_u64().unwrap() as u16;
    Ok(HttpResponse::new(status, str_field(case, "body").unwrap()))
}

fn assert_version(name: &str, version: &Version, expected: &Value) {
    assert_eq!(i64::from(version.id), expected["id"].as_i64().unwrap(), "{name}: id");
    assert_eq!(version.name.as_deref(), expected["name"].as_str(), "{name}: name");
    let status: Option<VersionStatus> = expected["status"].as_str().map(|s| s.parse().unwrap());
    assert_eq!(version.status, status, "{name}: status");
    assert_eq!(
        version.project.as_ref().map(|p| i64::from(p.id)),
        expected["project_id"].as_i64(),
        "{name}: project"
    );
    assert_eq!(
        version.due_date.map(|d| d.to_string()),
        expected["due_date"].as_str().map(str::to_string),
        "{name}: due date"
    );
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name").unwrap();
        let translator = ResponseTranslator::new(format_of(case));
        let result = translator.translate::<Version>(outcome_of(case), HttpMethod::Post);

        match str_field(case, "expected_error") {
            None => {
                let version = result.unwrap_or_else(|e| panic!("{name}: {e}"));
                assert_version(name, &version, &case["expected_version"]);
            }
            Some(kind) => {
                let err = result.expect_err(name);
                assert_eq!(error_kind_name(err.kind()), kind, "{name}");
                if let Some(expected) = case["expected_messages"].as_array() {
                    let expected: Vec<&str> = expected.iter().map(|m| m.as_str().unwrap()).collect();
                    match &err {
                        RedmineError::Validation { operation, messages } => {
                            assert_eq!(operation, "POST", "{name}");
                            assert_eq!(messages, &expected, "{name}");
                        }
                        other => panic!("{name}: expected validation error, got {other:?}"),
                    }
                }
            }
        }
    }
}
