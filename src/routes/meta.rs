//! Package metadata routes: fetch and publish on `/api/meta/:scope/:pkg`.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use http::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::route_manager::RouteManager;
use crate::store::MetaStore;

pub const META_PATH: &str = "/api/meta/:scope/:pkg";

fn status_message(status: u16, message: &str) -> HandlerResponse {
    HandlerResponse::json(status, json!({ "status": status, "message": message }))
}

fn internal_error() -> HandlerResponse {
    status_message(502, "internal error")
}

fn package_params(req: &HandlerRequest) -> Option<(&str, &str)> {
    Some((req.get_path_param("scope")?, req.get_path_param("pkg")?))
}

/// Body accepted by the publish route.
#[derive(Debug, Deserialize)]
struct PublishBody {
    latest_version: String,
}

/// A validated publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub scope: String,
    pub pkg: String,
    pub latest_version: String,
}

impl TryFrom<&HandlerRequest> for PublishRequest {
    type Error = anyhow::Error;

    fn try_from(req: &HandlerRequest) -> Result<Self, Self::Error> {
        let body = req
            .body
            .clone()
            .filter(serde_json::Value::is_object)
            .ok_or_else(|| anyhow!("missing JSON object body"))?;
        let body: PublishBody =
            serde_json::from_value(body).context("body does not match {latest_version}")?;
        if body.latest_version.is_empty() {
            return Err(anyhow!("latest_version is empty"));
        }
        let (scope, pkg) =
            package_params(req).ok_or_else(|| anyhow!("missing scope or pkg path parameter"))?;
        Ok(Self {
            scope: scope.to_string(),
            pkg: pkg.to_string(),
            latest_version: body.latest_version,
        })
    }
}

/// `GET /api/meta/:scope/:pkg`
pub fn fetch(store: &dyn MetaStore, req: &HandlerRequest) -> HandlerResponse {
    let Some((scope, pkg)) = package_params(req) else {
        error!(request_id = %req.request_id, "meta: scope or pkg path parameter missing");
        return internal_error();
    };

    match store.find_package(scope, pkg) {
        Ok(record) => match serde_json::to_value(&record) {
            Ok(body) => HandlerResponse::json(200, body),
            Err(e) => {
                error!(request_id = %req.request_id, error = %e, "meta: failed to encode package");
                internal_error()
            }
        },
        Err(e) if e.is_not_found() => {
            warn!(request_id = %req.request_id, scope = %scope, pkg = %pkg, "meta: package not found");
            status_message(404, "package not found")
        }
        Err(e) => {
            error!(
                request_id = %req.request_id,
                scope = %scope,
                pkg = %pkg,
                error = ?e,
                "meta: failed to fetch package metadata"
            );
            internal_error()
        }
    }
}

/// `POST /api/meta/:scope/:pkg` with `{"latest_version": "..."}`
pub fn publish(store: &dyn MetaStore, req: &HandlerRequest) -> HandlerResponse {
    let publish = match PublishRequest::try_from(req) {
        Ok(publish) => publish,
        Err(e) => {
            error!(request_id = %req.request_id, error = %e, "meta: invalid publish request");
            return internal_error();
        }
    };

    match store.create_package_with_version(&publish.scope, &publish.pkg, &publish.latest_version)
    {
        Ok(created) => HandlerResponse::json(
            200,
            json!({
                "status": 200,
                "package_id": created.package_id,
                "version_id": created.version_id,
            }),
        ),
        Err(e) => {
            error!(
                request_id = %req.request_id,
                scope = %publish.scope,
                pkg = %publish.pkg,
                error = ?e,
                "meta: failed to store package metadata"
            );
            internal_error()
        }
    }
}

pub fn register(manager: &mut RouteManager, store: &Arc<dyn MetaStore>) {
    let fetch_store = Arc::clone(store);
    manager.add_route(Method::GET, META_PATH, move |req| {
        fetch(fetch_store.as_ref(), req)
    });

    let publish_store = Arc::clone(store);
    manager.add_route(Method::POST, META_PATH, move |req| {
        publish(publish_store.as_ref(), req)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RequestId;
    use crate::router::ParamVec;
    use crate::store::{SqliteStore, StoreError, StoreResult};
    use crate::store::{CreatedRelease, PackageRecord};
    use serde_json::Value;

    fn request(method: Method, params: &[(&str, &str)], body: Option<Value>) -> HandlerRequest {
        let (reply_tx, _reply_rx) = may::sync::mpsc::channel();
        let path_params: ParamVec = params
            .iter()
            .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
            .collect();
        HandlerRequest {
            request_id: RequestId::new(),
            method,
            path: "/api/meta/acme/widget".to_string(),
            route_pattern: Arc::from(META_PATH),
            handler_name: String::new(),
            path_params,
            body,
            reply_tx,
        }
    }

    const PARAMS: &[(&str, &str)] = &[("scope", "acme"), ("pkg", "widget")];

    struct BrokenStore;

    impl MetaStore for BrokenStore {
        fn find_package(&self, _owner: &str, _name: &str) -> StoreResult<PackageRecord> {
            Err(StoreError::Query(rusqlite::Error::InvalidQuery))
        }

        fn create_package_with_version(
            &self,
            _owner: &str,
            _name: &str,
            _version: &str,
        ) -> StoreResult<CreatedRelease> {
            Err(StoreError::Query(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn fetch_missing_package_is_404() {
        let store = SqliteStore::open_in_memory().unwrap();
        let res = fetch(&store, &request(Method::GET, PARAMS, None));
        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({ "status": 404, "message": "package not found" }));
    }

    #[test]
    fn fetch_store_failure_is_502() {
        let res = fetch(&BrokenStore, &request(Method::GET, PARAMS, None));
        assert_eq!(res.status, 502);
        assert_eq!(res.body, json!({ "status": 502, "message": "internal error" }));
    }

    #[test]
    fn publish_then_fetch() {
        let store = SqliteStore::open_in_memory().unwrap();
        let body = json!({ "latest_version": "0.3.1" });
        let res = publish(&store, &request(Method::POST, PARAMS, Some(body)));
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], 200);

        let res = fetch(&store, &request(Method::GET, PARAMS, None));
        assert_eq!(res.status, 200);
        assert_eq!(res.body["owner"], "acme");
        assert_eq!(res.body["name"], "widget");
        assert_eq!(res.body["latest_version"], "0.3.1");
        assert_eq!(res.body["available_versions"][0]["version"], "0.3.1");
    }

    #[test]
    fn publish_rejects_bad_bodies_without_writing() {
        let store = SqliteStore::open_in_memory().unwrap();
        for body in [
            None,
            Some(json!({})),
            Some(json!({ "latest_version": "" })),
            Some(json!({ "latest_version": 3 })),
            Some(json!(["0.1.0"])),
        ] {
            let res = publish(&store, &request(Method::POST, PARAMS, body));
            assert_eq!(res.status, 502);
        }
        assert_eq!(store.package_count().unwrap(), 0);
        assert_eq!(store.version_count().unwrap(), 0);
    }

    #[test]
    fn publish_without_path_params_is_502() {
        let store = SqliteStore::open_in_memory().unwrap();
        let body = json!({ "latest_version": "1.0.0" });
        let res = publish(&store, &request(Method::POST, &[("scope", "acme")], Some(body)));
        assert_eq!(res.status, 502);
    }

    #[test]
    fn publish_store_failure_is_502() {
        let body = json!({ "latest_version": "1.0.0" });
        let res = publish(&BrokenStore, &request(Method::POST, PARAMS, Some(body)));
        assert_eq!(res.status, 502);
    }
}
