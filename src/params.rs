use serde_json::{Map, Value};

pub const DEFAULT_LANGUAGE: &str = "nodejs";
pub const DEFAULT_PLATFORM: &str = "github-actions";

pub fn as_object(value: Option<&Value>, key: &str) -> Result<Map<String, Value>, String> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(format!("`{key}` must be a JSON object")),
    }
}

pub fn get_optional_string(
    arguments: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, String> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("`{key}` must be a string")),
    }
}

pub fn get_required_string(arguments: &Map<String, Value>, key: &str) -> Result<String, String> {
    get_optional_string(arguments, key)?.ok_or_else(|| format!("`{key}` is required"))
}

/// Arguments of `generate_pipeline`. Language and platform are not checked
/// against the supported lists; unknown values pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineParams {
    pub description: String,
    pub language: String,
    pub platform: String,
    pub deployment_target: Option<String>,
}

impl PipelineParams {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, String> {
        let description = get_required_string(arguments, "description")?;
        let language = get_optional_string(arguments, "language")?
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned());
        let platform = get_optional_string(arguments, "platform")?
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_owned());
        let deployment_target = get_optional_string(arguments, "deploymentTarget")?;

        Ok(Self {
            description,
            language,
            platform,
            deployment_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_from_json(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn pipeline_params_apply_defaults() {
        let args = map_from_json(json!({"description": "Deploy a web app"}));
        let params = PipelineParams::from_arguments(&args).expect("parse params");
        assert_eq!(params.description, "Deploy a web app");
        assert_eq!(params.language, "nodejs");
        assert_eq!(params.platform, "github-actions");
        assert_eq!(params.deployment_target, None);
    }

    #[test]
    fn pipeline_params_pass_unknown_values_through() {
        let args = map_from_json(json!({
            "description": "Build it",
            "language": "cobol",
            "platform": "teamcity",
            "deploymentTarget": "mainframe"
        }));
        let params = PipelineParams::from_arguments(&args).expect("parse params");
        assert_eq!(params.language, "cobol");
        assert_eq!(params.platform, "teamcity");
        assert_eq!(params.deployment_target.as_deref(), Some("mainframe"));
    }

    #[test]
    fn pipeline_params_require_description() {
        let err = PipelineParams::from_arguments(&Map::new()).expect_err("should fail");
        assert_eq!(err, "`description` is required");

        let args = map_from_json(json!({"description": 12}));
        let err = PipelineParams::from_arguments(&args).expect_err("should fail");
        assert_eq!(err, "`description` must be a string");
    }

    #[test]
    fn pipeline_params_reject_non_string_options() {
        let args = map_from_json(json!({"description": "Build it", "language": ["go"]}));
        let err = PipelineParams::from_arguments(&args).expect_err("should fail");
        assert_eq!(err, "`language` must be a string");

        let args = map_from_json(json!({"description": "Build it", "platform": 3}));
        let err = PipelineParams::from_arguments(&args).expect_err("should fail");
        assert_eq!(err, "`platform` must be a string");
    }

    #[test]
    fn as_object_rejects_non_objects() {
        assert!(as_object(None, "params").expect("absent params").is_empty());
        assert!(
            as_object(Some(&Value::Null), "params")
                .expect("null params")
                .is_empty()
        );
        let err = as_object(Some(&json!([1, 2])), "params").expect_err("should fail");
        assert_eq!(err, "`params` must be a JSON object");
    }
}
