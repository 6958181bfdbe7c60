// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Map, Value};

use crate::errors::API_ERROR_CODES;

const ROLE_PATH: &str = "/v1/releases/{release_id}/roles/{role_name}";
const ROLES_PATH: &str = "/v1/releases/{release_id}/roles";
const NODE_TAGS_PATH: &str = "/v1/nodes/{node_id}/tags";

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": crate::API_ERROR_SCHEMA_REF}}}
    })
}

fn ok(description: &str) -> Value {
    json!({"description": description})
}

/// Error contract of the role and tag endpoints. Keys are emitted in sorted
/// order so the document hashes stably.
#[must_use]
pub fn openapi_v1_spec() -> Value {
    let codes: Vec<&str> = API_ERROR_CODES.iter().map(|c| c.as_str()).collect();
    let mut paths = Map::new();
    paths.insert(
        ROLES_PATH.to_string(),
        json!({
            "get": {"responses": {"200": ok("roles of the release"), "404": error_response("unknown release")}},
            "post": {"responses": {
                "201": ok("stored role"),
                "400": error_response("validation failed"),
                "404": error_response("unknown release"),
                "409": error_response("role already exists")
            }}
        }),
    );
    paths.insert(
        ROLE_PATH.to_string(),
        json!({
            "delete": {"responses": {
                "204": ok("role removed"),
                "400": error_response("role assigned to nodes"),
                "404": error_response("role not found")
            }},
            "get": {"responses": {"200": ok("stored role"), "404": error_response("role not found")}},
            "put": {"responses": {
                "200": ok("stored role"),
                "400": error_response("validation failed or name mismatch"),
                "404": error_response("role not found")
            }}
        }),
    );
    paths.insert(
        NODE_TAGS_PATH.to_string(),
        json!({
            "get": {"responses": {"200": ok("node tag bindings"), "404": error_response("unknown node")}}
        }),
    );

    json!({
        "components": {
            "schemas": {
                "ApiError": {
                    "additionalProperties": false,
                    "properties": {
                        "code": {"$ref": "#/components/schemas/ApiErrorCode"},
                        "details": {"type": "object"},
                        "message": {"type": "string"},
                        "request_id": {"type": "string"}
                    },
                    "required": ["code", "message", "details"],
                    "type": "object"
                },
                "ApiErrorCode": {"enum": codes, "type": "string"}
            }
        },
        "info": {"title": "rolemesh API", "version": "v1"},
        "openapi": "3.0.3",
        "paths": Value::Object(paths)
    })
}

/// Content hash of the canonical document; changes whenever the contract does.
pub fn openapi_v1_digest() -> Result<String, serde_json::Error> {
    rolemesh_core::canonical::stable_json_hash_hex(&openapi_v1_spec())
}
