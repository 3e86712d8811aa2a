use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::IdentifiableName;

/// The value of a custom field. Its shape is only known at runtime: fields
/// declared `multiple` carry a list.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldValue {
    Scalar(String),
    Multiple(Vec<String>),
}

impl CustomFieldValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            CustomFieldValue::Scalar(v) => vec![v.as_str()],
            CustomFieldValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// A custom field value attached to an issue, project, user, version, …
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueCustomField {
    pub id: i32,
    pub name: Option<String>,
    pub multiple: bool,
    pub value: Option<CustomFieldValue>,
}

impl IssueCustomField {
    pub fn scalar(id: i32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: Some(CustomFieldValue::Scalar(value.into())),
            ..Self::default()
        }
    }

    pub fn multiple(id: i32, values: Vec<String>) -> Self {
        Self {
            id,
            multiple: true,
            value: Some(CustomFieldValue::Multiple(values)),
            ..Self::default()
        }
    }
}

impl Decode for IssueCustomField {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "multiple" => self.multiple = field.to_bool()?,
            "value" if field.is_array => {
                self.value = Some(CustomFieldValue::Multiple(field.to_strings()?))
            }
            "value" => self.value = Some(CustomFieldValue::Scalar(field.to_text()?)),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(&mut self) {
        self.value = match self.value.take() {
            Some(CustomFieldValue::Scalar(single)) if self.multiple => {
                Some(CustomFieldValue::Multiple(vec![single]))
            }
            other => other,
        };
    }
}

impl Encode for IssueCustomField {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.attribute("id", self.id);
        if out.is_full() {
            out.optional_attribute("name", self.name.as_deref());
        }
        if self.multiple {
            out.attribute("multiple", true);
        }
        match &self.value {
            Some(CustomFieldValue::Scalar(v)) => out.value("value", v.as_str()),
            Some(CustomFieldValue::Multiple(vs)) => out.strings("value", "value", Some(vs.as_slice())),
            None => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomFieldPossibleValue {
    pub value: Option<String>,
    pub label: Option<String>,
}

impl Decode for CustomFieldPossibleValue {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "value" => self.value = Some(field.to_text()?),
            "label" => self.label = Some(field.to_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for CustomFieldPossibleValue {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.optional("value", self.value.as_deref());
        out.optional("label", self.label.as_deref());
    }
}

/// A custom field definition (`/custom_fields`, admin only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomField {
    pub id: i32,
    pub name: Option<String>,
    pub customized_type: Option<String>,
    pub field_format: Option<String>,
    pub regexp: Option<String>,
    pub min_length: Option<i32>,
    pub max_length: Option<i32>,
    pub is_required: Option<bool>,
    pub is_filter: Option<bool>,
    pub searchable: Option<bool>,
    pub multiple: Option<bool>,
    pub default_value: Option<String>,
    pub visible: Option<bool>,
    pub possible_values: Option<Vec<CustomFieldPossibleValue>>,
    pub trackers: Option<Vec<IdentifiableName>>,
    pub roles: Option<Vec<IdentifiableName>>,
}

impl Decode for CustomField {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "customized_type" => self.customized_type = Some(field.to_text()?),
            "field_format" => self.field_format = Some(field.to_text()?),
            "regexp" => self.regexp = Some(field.to_text()?),
            "min_length" => self.min_length = Some(field.to_i32()?),
            "max_length" => self.max_length = Some(field.to_i32()?),
            "is_required" => self.is_required = Some(field.to_bool()?),
            "is_filter" => self.is_filter = Some(field.to_bool()?),
            "searchable" => self.searchable = Some(field.to_bool()?),
            "multiple" => self.multiple = Some(field.to_bool()?),
            "default_value" => self.default_value = Some(field.to_text()?),
            "visible" => self.visible = Some(field.to_bool()?),
            "possible_values" => self.possible_values = Some(field.collection()?),
            "trackers" => self.trackers = Some(field.collection()?),
            "roles" => self.roles = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for CustomField {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("customized_type", self.customized_type.as_deref());
        out.optional("field_format", self.field_format.as_deref());
        out.optional("regexp", self.regexp.as_deref());
        out.optional("min_length", self.min_length);
        out.optional("max_length", self.max_length);
        out.optional("is_required", self.is_required);
        out.optional("is_filter", self.is_filter);
        out.optional("searchable", self.searchable);
        out.optional("multiple", self.multiple);
        out.optional("default_value", self.default_value.as_deref());
        out.optional("visible", self.visible);
        out.collection("possible_values", "possible_value", self.possible_values.as_deref());
        if out.is_full() {
            out.collection("trackers", "tracker", self.trackers.as_deref());
            out.collection("roles", "role", self.roles.as_deref());
        } else {
            out.ids("tracker_ids", "tracker_id", self.trackers.as_deref());
            out.ids("role_ids", "role_id", self.roles.as_deref());
        }
    }
}

impl Entity for CustomField {
    const KIND: EntityKind = EntityKind::CustomField;
    const ROOT: &'static str = "custom_field";
    const COLLECTION: &'static str = "custom_fields";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MimeFormat;
    use crate::serialization::{decode, encode, WriteMode};
    use crate::types::Issue;

    #[test]
    fn multiple_field_with_one_xml_value_is_a_sequence() {
        let payload = r#"<issue><custom_fields type="array">
            <custom_field id="1" name="Platforms" multiple="true"><value>Linux</value></custom_field>
        </custom_fields></issue>"#;
        let issue: Issue = decode(payload, MimeFormat::Xml).unwrap();
        let field = &issue.custom_fields.unwrap()[0];
        assert_eq!(field.value, Some(CustomFieldValue::Multiple(vec!["Linux".into()])));
    }

    #[test]
    fn multiple_field_with_array_json_value() {
        let payload = r#"{"issue":{"custom_fields":[
            {"id":1,"name":"Platforms","multiple":true,"value":["Linux","BSD"]},
            {"id":2,"name":"Build","value":"1.2.3"}
        ]}}"#;
        let issue: Issue = decode(payload, MimeFormat::Json).unwrap();
        let fields = issue.custom_fields.unwrap();
        assert_eq!(
            fields[0].value,
            Some(CustomFieldValue::Multiple(vec!["Linux".into(), "BSD".into()]))
        );
        assert_eq!(fields[1].value, Some(CustomFieldValue::Scalar("1.2.3".into())));
        assert!(!fields[1].multiple);
    }

    #[test]
    fn multiple_flag_after_value_still_normalizes() {
        let payload = r#"{"issue":{"custom_fields":[{"id":1,"value":"Linux","multiple":true}]}}"#;
        let issue: Issue = decode(payload, MimeFormat::Json).unwrap();
        assert_eq!(
            issue.custom_fields.unwrap()[0].value,
            Some(CustomFieldValue::Multiple(vec!["Linux".into()]))
        );
    }

    #[test]
    fn empty_value_placeholder_leaves_value_unset() {
        let payload = r#"<issue><custom_fields type="array"><custom_field id="3" name="Notes"><value/></custom_field></custom_fields></issue>"#;
        let issue: Issue = decode(payload, MimeFormat::Xml).unwrap();
        assert_eq!(issue.custom_fields.unwrap()[0].value, None);
    }

    #[test]
    fn request_body_omits_name() {
        let issue = Issue {
            custom_fields: Some(vec![IssueCustomField {
                name: Some("Build".into()),
                ..IssueCustomField::scalar(2, "1.2.3")
            }]),
            ..Issue::default()
        };
        let xml = encode(&issue, WriteMode::Create, MimeFormat::Xml).unwrap();
        assert!(xml.contains(r#"<custom_field id="2"><value>1.2.3</value></custom_field>"#), "{xml}");
        let json: serde_json::Value =
            serde_json::from_str(&encode(&issue, WriteMode::Create, MimeFormat::Json).unwrap()).unwrap();
        assert_eq!(json["issue"]["custom_fields"], serde_json::json!([{"id": 2, "value": "1.2.3"}]));
    }

    #[test]
    fn multiple_values_encode_as_array() {
        let issue = Issue {
            custom_fields: Some(vec![IssueCustomField::multiple(1, vec!["a".into(), "b".into()])]),
            ..Issue::default()
        };
        let xml = encode(&issue, WriteMode::Update, MimeFormat::Xml).unwrap();
        assert!(
            xml.contains(r#"<value type="array"><value>a</value><value>b</value></value>"#),
            "{xml}"
        );
    }

    #[test]
    fn definition_decodes_possible_values() {
        let payload = r#"{"custom_fields":[{"id":4,"name":"Severity","field_format":"list","multiple":false,
            "possible_values":[{"value":"low","label":"Low"},{"value":"high","label":"High"}],
            "trackers":[{"id":1,"name":"Bug"}]}]}"#;
        let page = crate::serialization::decode_list::<CustomField>(payload, MimeFormat::Json).unwrap();
        let field = &page.items[0];
        assert_eq!(field.possible_values.as_ref().unwrap().len(), 2);
        assert_eq!(field.trackers.as_ref().unwrap()[0], IdentifiableName::new(1, "Bug"));
        assert_eq!(field.multiple, Some(false));
    }
}
