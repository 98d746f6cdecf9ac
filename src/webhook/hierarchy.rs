//! HierarchicalNamespace Validation Webhook
//!
//! Translates AdmissionReview requests for HierarchicalNamespace objects into
//! [`EdgeOperation`]s, hands them to the [`HierarchyValidator`] and turns the
//! verdict back into an admission response. No policy lives here.

use std::sync::Arc;

use axum::{extract::State, Json};
use kube::{
    api::DynamicObject,
    core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
};
use tracing::{debug, error, warn};

use crate::validator::{DenialReason, EdgeOperation, HierarchyValidator, Verdict};

use super::WebhookState;

/// Requests the adapter rejects before they reach the validator
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// Neither the request nor the object names the parent namespace
    #[error("hierarchical namespace has no parent namespace")]
    MissingParent,

    /// Neither the request nor the object names the subnamespace
    #[error("hierarchical namespace has no name")]
    MissingChild,
}

/// Handle validating admission review for HierarchicalNamespaces
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    let response = review_hierarchy_edge(&state.validator, &req);
    Json(response.into_review())
}

/// Decide a single HierarchicalNamespace admission request
pub fn review_hierarchy_edge(
    validator: &HierarchyValidator,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = &request.uid;

    let operation = match edge_operation(request) {
        Ok(Some(op)) => op,
        Ok(None) => {
            debug!(uid = %uid, operation = ?request.operation, "Not an edge change, allowing");
            return AdmissionResponse::from(request);
        }
        Err(e) => {
            warn!(uid = %uid, error = %e, "Rejecting malformed hierarchy request");
            return into_response(request, &Verdict::deny(DenialReason::InvalidRequest, e));
        }
    };

    let verdict = validator.decide(&operation);
    debug!(uid = %uid, edge = %operation.edge(), allowed = verdict.allowed, "Hierarchy edge reviewed");
    into_response(request, &verdict)
}

/// Extract the proposed edge change from an admission request
///
/// The parent is the request namespace and the child the request name, each
/// falling back to the submitted object's metadata. Returns `Ok(None)` for
/// operations that do not change an edge (updates, connects).
pub fn edge_operation(
    request: &AdmissionRequest<DynamicObject>,
) -> Result<Option<EdgeOperation>, AdmissionError> {
    let is_create = match request.operation {
        Operation::Create => true,
        Operation::Delete => false,
        Operation::Update | Operation::Connect => return Ok(None),
    };

    let object = request.object.as_ref().or(request.old_object.as_ref());

    let parent = non_empty(request.namespace.as_deref())
        .or_else(|| object.and_then(|o| non_empty(o.metadata.namespace.as_deref())))
        .ok_or(AdmissionError::MissingParent)?;
    let child = non_empty(Some(request.name.as_str()))
        .or_else(|| object.and_then(|o| non_empty(o.metadata.name.as_deref())))
        .ok_or(AdmissionError::MissingChild)?;

    Ok(Some(if is_create {
        EdgeOperation::create(parent, child)
    } else {
        EdgeOperation::delete(parent, child)
    }))
}

/// Attach a verdict to the response envelope for `request`
fn into_response(request: &AdmissionRequest<DynamicObject>, verdict: &Verdict) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);
    match &verdict.denial {
        None => response,
        Some(denial) => {
            let mut response = response.deny(&denial.message);
            response.result.reason = denial.reason.status_reason().to_string();
            response.result.code = denial.reason.status_code();
            response
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::Forest;
    use serde_json::json;

    // =========================================================================
    // Test Fixtures
    // =========================================================================

    fn review(operation: &str, namespace: &str, name: &str) -> AdmissionReview<DynamicObject> {
        let object = json!({
            "apiVersion": "hnc.x-k8s.io/v1alpha1",
            "kind": "HierarchicalNamespace",
            "metadata": { "name": name, "namespace": namespace },
        });
        let (object, old_object) = if operation == "DELETE" {
            (serde_json::Value::Null, object)
        } else {
            (object, serde_json::Value::Null)
        };

        serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "kind": { "group": "hnc.x-k8s.io", "version": "v1alpha1", "kind": "HierarchicalNamespace" },
                "resource": { "group": "hnc.x-k8s.io", "version": "v1alpha1", "resource": "hierarchicalnamespaces" },
                "name": name,
                "namespace": namespace,
                "operation": operation,
                "userInfo": { "username": "admin" },
                "object": object,
                "oldObject": old_object,
                "dryRun": false,
            }
        }))
        .unwrap()
    }

    fn request(operation: &str, namespace: &str, name: &str) -> AdmissionRequest<DynamicObject> {
        review(operation, namespace, name).try_into().unwrap()
    }

    fn validator() -> HierarchyValidator {
        let forest = Arc::new(Forest::default());
        forest.get_or_create("foo");
        forest.get_or_create("bar");
        forest.get_or_create("baz");
        forest.set_parent("baz", Some("foo")).unwrap();
        forest.set_owned("baz", true).unwrap();
        forest.set_allow_cascading_delete("baz", true).unwrap();
        HierarchyValidator::new(forest)
    }

    // =========================================================================
    // Translation Tests
    // =========================================================================

    #[test]
    fn test_create_maps_namespace_to_parent_and_name_to_child() {
        let op = edge_operation(&request("CREATE", "foo", "brumpf")).unwrap();
        assert_eq!(op, Some(EdgeOperation::create("foo", "brumpf")));
    }

    #[test]
    fn test_delete_maps_to_delete_operation() {
        let op = edge_operation(&request("DELETE", "foo", "baz")).unwrap();
        assert_eq!(op, Some(EdgeOperation::delete("foo", "baz")));
    }

    #[test]
    fn test_update_is_not_an_edge_change() {
        assert_eq!(edge_operation(&request("UPDATE", "foo", "baz")).unwrap(), None);
    }

    #[test]
    fn test_falls_back_to_object_metadata() {
        let mut req = request("CREATE", "foo", "brumpf");
        req.namespace = None;
        req.name = String::new();
        let op = edge_operation(&req).unwrap();
        assert_eq!(op, Some(EdgeOperation::create("foo", "brumpf")));
    }

    #[test]
    fn test_missing_endpoints_are_rejected() {
        assert_eq!(
            edge_operation(&request("CREATE", "", "brumpf")),
            Err(AdmissionError::MissingParent)
        );
        assert_eq!(
            edge_operation(&request("CREATE", "foo", "")),
            Err(AdmissionError::MissingChild)
        );
    }

    // =========================================================================
    // Story Tests
    // =========================================================================

    /// Story: an allowed edge produces an allowing response for the same uid
    #[test]
    fn story_allowed_edge_passes_through() {
        let req = request("CREATE", "foo", "brumpf");
        let response = review_hierarchy_edge(&validator(), &req);

        assert!(response.allowed);
        assert_eq!(response.uid, req.uid);
    }

    /// Story: a denial carries the validator's message, reason and code
    #[test]
    fn story_denied_edge_reports_reason() {
        let response = review_hierarchy_edge(&validator(), &request("CREATE", "foo", "bar"));

        assert!(!response.allowed);
        assert!(response
            .result
            .message
            .starts_with("name collision with existing namespace"));
        assert_eq!(response.result.reason, "Conflict");
        assert_eq!(response.result.code, 409);
    }

    /// Story: excluded parents are refused with Forbidden
    #[test]
    fn story_excluded_parent_forbidden() {
        let response =
            review_hierarchy_edge(&validator(), &request("CREATE", "kube-system", "brumpf"));

        assert!(!response.allowed);
        assert_eq!(response.result.reason, "Forbidden");
        assert_eq!(response.result.code, 403);
    }

    /// Story: a request without a child name never reaches the validator
    #[test]
    fn story_malformed_request_is_invalid() {
        let response = review_hierarchy_edge(&validator(), &request("CREATE", "foo", ""));

        assert!(!response.allowed);
        assert!(response.result.message.starts_with("invalid request"));
        assert_eq!(response.result.code, 400);
    }

    /// Story: deleting a protected edge is distinguished from a missing one
    #[test]
    fn story_delete_reasons_are_distinct() {
        let v = validator();
        v.forest().set_allow_cascading_delete("baz", false).unwrap();

        let protected = review_hierarchy_edge(&v, &request("DELETE", "foo", "baz"));
        assert!(!protected.allowed);
        assert_eq!(protected.result.reason, "Forbidden");

        let missing = review_hierarchy_edge(&v, &request("DELETE", "foo", "bar"));
        assert!(!missing.allowed);
        assert_eq!(missing.result.reason, "NotFound");
    }
}
