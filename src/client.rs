// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Blocking client for the assisted installer REST API.
//!
//! Each operation is one request checked against exactly one success code.
//! The bearer token is obtained once in [`ApiClient::connect`] and never
//! refreshed.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::*;

pub const PULL_SECRET_URL: &str = "https://api.openshift.com/api/accounts_mgmt/v1/access_token";
const CLIENT_ID: &str = "cloud-services";

pub struct ApiClient {
    http: Client,
    api_url: String,
    pull_secret_url: String,
    access_token: String,
}

/// Exchange an offline token for a short-lived access token.
fn fetch_access_token(http: &Client, sso_url: &str, offline_token: &str) -> Result<String> {
    debug!("asking {} for access token", sso_url);
    let params = [
        ("client_id", CLIENT_ID),
        ("grant_type", "refresh_token"),
        ("refresh_token", offline_token),
    ];
    let resp = http.post(sso_url).form(&params).send()?;
    if resp.status() != StatusCode::OK {
        return Err(Error::Token(
            resp.status()
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
        ));
    }
    let token: TokenResponse = resp.json()?;
    debug!("got {} token, expires in {}s", token.token_type, token.expires_in);
    Ok(token.access_token)
}

/// Turn any response other than `expected` into [`Error::Status`].
fn expect_status<F>(resp: Response, expected: StatusCode, context: F) -> Result<Response>
where
    F: FnOnce() -> String,
{
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_else(|_| "unknown error".to_string());
    Err(Error::Status {
        context: context(),
        status,
        body,
    })
}

impl ApiClient {
    pub fn connect(config: &Config) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(60))
            .build()?;
        let access_token = fetch_access_token(&http, &config.sso_url, &config.offline_token)?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            pull_secret_url: PULL_SECRET_URL.to_string(),
            access_token,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!("creating {} request for {}", method, url);
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    fn api(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, format!("{}{}", self.api_url, path))
    }

    pub fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let resp = self.api(Method::GET, "/clusters").send()?;
        let resp = expect_status(resp, StatusCode::OK, || "failed to list clusters".into())?;
        Ok(resp.json()?)
    }

    pub fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        let resp = self
            .api(Method::GET, &format!("/clusters/{}", cluster_id))
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, || {
            format!("failed to get cluster {}", cluster_id)
        })?;
        Ok(resp.json()?)
    }

    pub fn create_cluster(&self, params: &ClusterCreateParams) -> Result<Cluster> {
        let resp = self.api(Method::POST, "/clusters").json(params).send()?;
        let resp = expect_status(resp, StatusCode::CREATED, || {
            format!("failed to create cluster {}", params.name)
        })?;
        Ok(resp.json()?)
    }

    /// The returned cluster is the server's authoritative copy; callers
    /// replace their working copy with it.
    pub fn patch_cluster<P: serde::Serialize>(&self, cluster_id: &str, patch: &P) -> Result<Cluster> {
        debug!(
            "patching cluster {} with: {}",
            cluster_id,
            serde_json::to_string(patch)?
        );
        let resp = self
            .api(Method::PATCH, &format!("/clusters/{}", cluster_id))
            .json(patch)
            .send()?;
        let resp = expect_status(resp, StatusCode::CREATED, || {
            format!("failed to patch cluster {}", cluster_id)
        })?;
        Ok(resp.json()?)
    }

    fn cluster_action(&self, cluster_id: &str, action: &str) -> Result<()> {
        let resp = self
            .api(
                Method::POST,
                &format!("/clusters/{}/actions/{}", cluster_id, action),
            )
            .send()?;
        expect_status(resp, StatusCode::ACCEPTED, || {
            format!("failed to {} cluster {}", action, cluster_id)
        })?;
        Ok(())
    }

    pub fn install_cluster(&self, cluster_id: &str) -> Result<()> {
        self.cluster_action(cluster_id, "install")
    }

    pub fn cancel_cluster(&self, cluster_id: &str) -> Result<()> {
        self.cluster_action(cluster_id, "cancel")
    }

    pub fn reset_cluster(&self, cluster_id: &str) -> Result<()> {
        self.cluster_action(cluster_id, "reset")
    }

    pub fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        let resp = self
            .api(Method::DELETE, &format!("/clusters/{}", cluster_id))
            .send()?;
        expect_status(resp, StatusCode::NO_CONTENT, || {
            format!("failed to delete cluster {}", cluster_id)
        })?;
        Ok(())
    }

    pub fn get_host(&self, cluster_id: &str, host_id: &str) -> Result<Host> {
        let resp = self
            .api(
                Method::GET,
                &format!("/clusters/{}/hosts/{}", cluster_id, host_id),
            )
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, || {
            format!("failed to get host {}", host_id)
        })?;
        Ok(resp.json()?)
    }

    pub fn delete_host(&self, cluster_id: &str, host_id: &str) -> Result<()> {
        let resp = self
            .api(
                Method::DELETE,
                &format!("/clusters/{}/hosts/{}", cluster_id, host_id),
            )
            .send()?;
        expect_status(resp, StatusCode::NO_CONTENT, || {
            format!("failed to delete host {}", host_id)
        })?;
        Ok(())
    }

    pub fn set_hostnames(&self, cluster_id: &str, names: Vec<HostName>) -> Result<Cluster> {
        self.patch_cluster(cluster_id, &HostNameList { hosts_names: names })
    }

    pub fn get_pull_secret(&self) -> Result<PullSecret> {
        let resp = self
            .request(Method::POST, self.pull_secret_url.clone())
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, || {
            "failed to get pull secret".into()
        })?;
        Ok(resp.json()?)
    }

    pub fn create_discovery_image(
        &self,
        cluster_id: &str,
        image_type: &str,
        ssh_public_key: &str,
    ) -> Result<Cluster> {
        let params = ImageCreateParams {
            image_type: image_type.to_string(),
            ssh_public_key: ssh_public_key.to_string(),
        };
        let resp = self
            .api(
                Method::POST,
                &format!("/clusters/{}/downloads/image", cluster_id),
            )
            .json(&params)
            .send()?;
        let resp = expect_status(resp, StatusCode::CREATED, || {
            format!("failed to create discovery image for cluster {}", cluster_id)
        })?;
        Ok(resp.json()?)
    }

    pub fn get_kubeconfig(&self, cluster_id: &str) -> Result<Vec<u8>> {
        let resp = self
            .api(
                Method::GET,
                &format!("/clusters/{}/downloads/kubeconfig", cluster_id),
            )
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, || {
            "failed to fetch kubeconfig".into()
        })?;
        Ok(resp.bytes()?.to_vec())
    }

    /// `filename` must already have been checked against the download
    /// whitelist.
    pub fn get_file(&self, cluster_id: &str, filename: &str) -> Result<Vec<u8>> {
        let resp = self
            .api(
                Method::GET,
                &format!("/clusters/{}/downloads/files", cluster_id),
            )
            .query(&[("file_name", filename)])
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, || {
            format!("failed to fetch {}", filename)
        })?;
        Ok(resp.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{
        bearer_token, body_partial_json, body_string_contains, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "access-123";

    /// A mock API server. The server runs on its own thread, so the
    /// blocking client is driven from the test thread outside the runtime.
    struct Fake {
        server: MockServer,
        rt: Runtime,
    }

    impl Fake {
        fn start() -> Self {
            let rt = Runtime::new().unwrap();
            let server = rt.block_on(MockServer::start());
            Self { server, rt }
        }

        fn mount(&self, mock: Mock) {
            self.rt.block_on(mock.mount(&self.server));
        }

        fn config(&self) -> Config {
            Config {
                offline_token: "offline-abc".into(),
                api_url: self.server.uri(),
                sso_url: format!("{}/token", self.server.uri()),
            }
        }

        fn client(&self) -> ApiClient {
            ApiClient {
                http: Client::new(),
                api_url: self.server.uri(),
                pull_secret_url: format!("{}/access_token", self.server.uri()),
                access_token: TOKEN.into(),
            }
        }
    }

    fn cluster_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "demo",
            "openshift_version": "4.8",
            "status": "insufficient",
            "machine_network_cidr": "192.168.1.0/24"
        })
    }

    fn status_of(err: Error) -> StatusCode {
        match err {
            Error::Status { status, .. } => status,
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn connect_exchanges_offline_token() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .and(body_string_contains("grant_type=refresh_token"))
                .and(body_string_contains("client_id=cloud-services"))
                .and(body_string_contains("refresh_token=offline-abc"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": TOKEN,
                    "expires_in": 900,
                    "token_type": "Bearer"
                })))
                .expect(1),
        );
        fake.mount(
            Mock::given(method("GET"))
                .and(path("/clusters"))
                .and(bearer_token(TOKEN))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([cluster_json("c1")]))),
        );

        let client = ApiClient::connect(&fake.config()).unwrap();
        let clusters = client.list_clusters().unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id, "c1");
    }

    #[test]
    fn token_endpoint_refusal_is_token_error() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant")),
        );

        match ApiClient::connect(&fake.config()) {
            Err(Error::Token(reason)) => assert_eq!(reason, "Unauthorized"),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("connect succeeded with a refused token"),
        }
    }

    #[test]
    fn patch_answered_with_ok_is_rejected() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("PATCH"))
                .and(path("/clusters/c1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"}))),
        );

        let patch = ClusterNetworkPatch {
            api_vip: "192.168.1.5".into(),
            ingress_vip: "192.168.1.6".into(),
            vip_dhcp_allocation: false,
        };
        let err = fake.client().patch_cluster("c1", &patch).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"failed to patch cluster c1: OK [200]: {"id":"c1"}"#
        );
        assert_eq!(status_of(err), StatusCode::OK);
    }

    #[test]
    fn delete_requires_no_content() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("DELETE"))
                .and(path("/clusters/c1"))
                .respond_with(ResponseTemplate::new(200)),
        );
        fake.mount(
            Mock::given(method("DELETE"))
                .and(path("/clusters/c1/hosts/h1"))
                .and(bearer_token(TOKEN))
                .respond_with(ResponseTemplate::new(204))
                .expect(1),
        );

        let client = fake.client();
        assert_eq!(status_of(client.delete_cluster("c1").unwrap_err()), StatusCode::OK);
        client.delete_host("c1", "h1").unwrap();
    }

    #[test]
    fn actions_require_accepted() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/clusters/c1/actions/install"))
                .respond_with(ResponseTemplate::new(202).set_body_json(cluster_json("c1")))
                .expect(1),
        );
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/clusters/c1/actions/reset"))
                .respond_with(ResponseTemplate::new(409).set_body_string("not installing")),
        );

        let client = fake.client();
        client.install_cluster("c1").unwrap();
        let err = client.reset_cluster("c1").unwrap_err();
        assert!(err.to_string().starts_with("failed to reset cluster c1: Conflict [409]"));
    }

    #[test]
    fn created_cluster_can_be_fetched_back() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/clusters"))
                .and(bearer_token(TOKEN))
                .and(body_partial_json(json!({
                    "name": "demo",
                    "openshift_version": "4.8",
                    "network_type": "OVNKubernetes"
                })))
                .respond_with(ResponseTemplate::new(201).set_body_json(cluster_json("c1")))
                .expect(1),
        );
        fake.mount(
            Mock::given(method("GET"))
                .and(path("/clusters/c1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(cluster_json("c1"))),
        );

        let client = fake.client();
        let created = client
            .create_cluster(&ClusterCreateParams {
                name: "demo".into(),
                openshift_version: "4.8".into(),
                pull_secret: "{}".into(),
                network_type: Some("OVNKubernetes".into()),
                ..Default::default()
            })
            .unwrap();
        let fetched = client.get_cluster(&created.id).unwrap();
        assert_eq!(fetched.name, "demo");
        assert_eq!(fetched.openshift_version, "4.8");
        assert_eq!(fetched, created);
    }

    #[test]
    fn create_answered_with_ok_is_rejected() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/clusters"))
                .respond_with(ResponseTemplate::new(200).set_body_json(cluster_json("c1"))),
        );

        let err = fake
            .client()
            .create_cluster(&ClusterCreateParams {
                name: "demo".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::OK);
    }

    #[test]
    fn repeated_vip_patch_is_stable() {
        let fake = Fake::start();
        let mut patched = cluster_json("c1");
        patched["api_vip"] = json!("192.168.1.5");
        patched["ingress_vip"] = json!("192.168.1.6");
        fake.mount(
            Mock::given(method("PATCH"))
                .and(path("/clusters/c1"))
                .and(body_partial_json(json!({
                    "api_vip": "192.168.1.5",
                    "ingress_vip": "192.168.1.6",
                    "vip_dhcp_allocation": false
                })))
                .respond_with(ResponseTemplate::new(201).set_body_json(patched))
                .expect(2),
        );

        let client = fake.client();
        let patch = ClusterNetworkPatch {
            api_vip: "192.168.1.5".into(),
            ingress_vip: "192.168.1.6".into(),
            vip_dhcp_allocation: false,
        };
        let first = client.patch_cluster("c1", &patch).unwrap();
        let second = client.patch_cluster("c1", &patch).unwrap();
        assert_eq!(first.api_vip, "192.168.1.5");
        assert_eq!(first.ingress_vip, "192.168.1.6");
        assert_eq!(first, second);
    }

    #[test]
    fn hostnames_are_sent_as_one_patch() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("PATCH"))
                .and(path("/clusters/c1"))
                .and(body_partial_json(json!({
                    "hosts_names": [
                        {"id": "h1", "hostname": "master-0"},
                        {"id": "h2", "hostname": "master-1"}
                    ]
                })))
                .respond_with(ResponseTemplate::new(201).set_body_json(cluster_json("c1")))
                .expect(1),
        );

        let names = vec![
            HostName {
                id: "h1".into(),
                hostname: "master-0".into(),
            },
            HostName {
                id: "h2".into(),
                hostname: "master-1".into(),
            },
        ];
        fake.client().set_hostnames("c1", names).unwrap();
    }

    #[test]
    fn pull_secret_is_posted_with_bearer() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/access_token"))
                .and(bearer_token(TOKEN))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "auths": {"quay.io": {"auth": "dXNlcjpwYXNz", "email": "me@example.com"}}
                })))
                .expect(1),
        );

        let ps = fake.client().get_pull_secret().unwrap();
        assert_eq!(ps.auths["quay.io"].auth, "dXNlcjpwYXNz");
    }

    #[test]
    fn discovery_image_requires_created() {
        let fake = Fake::start();
        let mut with_image = cluster_json("c1");
        with_image["image_info"] = json!({"download_url": "https://example.com/c1.iso"});
        fake.mount(
            Mock::given(method("POST"))
                .and(path("/clusters/c1/downloads/image"))
                .and(body_partial_json(json!({"image_type": "minimal-iso"})))
                .respond_with(ResponseTemplate::new(201).set_body_json(with_image)),
        );

        let cluster = fake
            .client()
            .create_discovery_image("c1", "minimal-iso", "")
            .unwrap();
        assert_eq!(cluster.image_info.download_url, "https://example.com/c1.iso");
    }

    #[test]
    fn file_download_passes_name_as_query() {
        let fake = Fake::start();
        fake.mount(
            Mock::given(method("GET"))
                .and(path("/clusters/c1/downloads/files"))
                .and(query_param("file_name", "install-config.yaml"))
                .respond_with(ResponseTemplate::new(200).set_body_string("apiVersion: v1\n")),
        );
        fake.mount(
            Mock::given(method("GET"))
                .and(path("/clusters/c1/downloads/kubeconfig"))
                .respond_with(ResponseTemplate::new(404).set_body_string("not ready")),
        );

        let client = fake.client();
        let content = client.get_file("c1", "install-config.yaml").unwrap();
        assert_eq!(content, b"apiVersion: v1\n");
        let err = client.get_kubeconfig("c1").unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch kubeconfig: Not Found [404]: not ready");
    }
}
