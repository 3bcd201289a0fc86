use crate::error::AppError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::credentials::{self, LcuCredentials};
use super::{LcuApi, LcuResponse};

/// The client serves a certificate signed by Riot's own root on 127.0.0.1.
/// Requests never leave loopback, so any certificate is accepted there.
#[derive(Debug)]
struct LoopbackCertVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for LoopbackCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

fn loopback_tls_config() -> Result<Arc<ClientConfig>, AppError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = LoopbackCertVerifier {
        algorithms: provider.signature_verification_algorithms,
    };

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| AppError::LcuError(format!("TLS setup failed: {}", e)))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(Arc::new(config))
}

pub struct LcuClient {
    base_url: String,
    auth: String,
    agent: ureq::Agent,
}

impl LcuClient {
    pub fn new(credentials: LcuCredentials) -> Result<Self, AppError> {
        let agent = ureq::AgentBuilder::new()
            .tls_config(loopback_tls_config()?)
            .timeout(Duration::from_secs(5))
            .build();

        Ok(LcuClient {
            base_url: format!("https://127.0.0.1:{}", credentials.port),
            auth: credentials.basic_auth(),
            agent,
        })
    }

    /// Locates the running client and builds a client for it.
    pub fn connect(install_dir: Option<&Path>) -> Result<Self, AppError> {
        let credentials = credentials::discover(install_dir)?;
        match credentials.pid {
            Some(pid) => log::info!("Connected to League client on port {} (pid {})", credentials.port, pid),
            None => log::info!("Connected to League client on port {}", credentials.port),
        }
        Self::new(credentials)
    }
}

impl LcuApi for LcuClient {
    fn request(&self, method: &str, endpoint: &str, body: Option<&str>) -> Result<LcuResponse, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        log::debug!("LCU {} {}", method, endpoint);

        let request = self
            .agent
            .request(method, &url)
            .set("Authorization", &self.auth)
            .set("Accept", "application/json");

        let result = match body {
            Some(body) => request.set("Content-Type", "application/json").send_string(body),
            None => request.call(),
        };

        into_lcu_response(result)
    }
}

/// Non-2xx answers are data for the caller; only transport failures are errors.
fn into_lcu_response(result: Result<ureq::Response, ureq::Error>) -> Result<LcuResponse, AppError> {
    match result {
        Ok(resp) => {
            let status = resp.status();
            let body = resp
                .into_string()
                .map_err(|e| AppError::LcuError(e.to_string()))?;
            Ok(LcuResponse { status, body })
        }
        Err(ureq::Error::Status(status, resp)) => Ok(LcuResponse {
            status,
            body: resp.into_string().unwrap_or_default(),
        }),
        Err(e) => Err(AppError::LcuError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_keeps_status_and_body() {
        let resp = ureq::Response::new(200, "OK", r#"{"phase":"Lobby"}"#).unwrap();
        let lcu = into_lcu_response(Ok(resp)).unwrap();
        assert_eq!(lcu.status, 200);
        assert_eq!(lcu.body, r#"{"phase":"Lobby"}"#);
        assert!(lcu.is_success());
    }

    #[test]
    fn error_statuses_are_returned_as_data() {
        let resp = ureq::Response::new(404, "Not Found", r#"{"message":"No active delegate"}"#).unwrap();
        let lcu = into_lcu_response(Err(ureq::Error::Status(404, resp))).unwrap();
        assert_eq!(lcu.status, 404);
        assert!(lcu.body.contains("No active delegate"));
        assert!(!lcu.is_success());

        let resp = ureq::Response::new(500, "Internal Server Error", "").unwrap();
        let lcu = into_lcu_response(Err(ureq::Error::Status(500, resp))).unwrap();
        assert_eq!(lcu.status, 500);
    }
}
