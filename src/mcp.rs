use crate::params::{PipelineParams, as_object};
use crate::protocol::{
    INTERNAL_ERROR, METHOD_NOT_FOUND, Request, Response, error_response, success_response,
};
use crate::tools::catalog::{LANGUAGES, PLATFORMS, list_languages, list_platforms};
use crate::tools::generate::PipelineGenerator;
use serde_json::{Value, json};

fn tools_definition() -> Value {
    json!([
        {
            "name": "generate_pipeline",
            "description": "Generate a CI/CD pipeline configuration from natural language",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "description": {"type": "string"},
                    "language": {"type": "string", "enum": LANGUAGES},
                    "platform": {"type": "string", "enum": PLATFORMS},
                    "deploymentTarget": {"type": "string"}
                },
                "required": ["description"]
            }
        },
        {
            "name": "list_languages",
            "description": "List supported programming languages"
        },
        {
            "name": "list_platforms",
            "description": "List supported CI/CD platforms"
        }
    ])
}

async fn call_generate_pipeline(
    generator: &PipelineGenerator,
    params: Option<&Value>,
) -> Result<String, String> {
    let arguments = as_object(params, "params")?;
    let params = PipelineParams::from_arguments(&arguments)?;
    Ok(generator.generate(&params).await)
}

/// Every decoded request gets exactly one response, carrying its `id` as sent.
pub async fn handle_request(request: Request, generator: &PipelineGenerator) -> Response {
    let Request { id, method, params } = request;

    match method.as_str() {
        "generate_pipeline" => match call_generate_pipeline(generator, params.as_ref()).await {
            Ok(text) => success_response(id, Value::String(text)),
            Err(message) => error_response(id, INTERNAL_ERROR, message),
        },
        "list_languages" => success_response(id, list_languages()),
        "list_platforms" => success_response(id, list_platforms()),
        "tools/list" => success_response(id, json!({ "tools": tools_definition() })),
        _ => error_response(id, METHOD_NOT_FOUND, format!("Method not found: {method}")),
    }
}
