// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TLS connector for the streaming channel.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_tungstenite::Connector;

use crate::discovery::ConnectionDescriptor;
use crate::error::ProtocolError;

/// Returns the connector matching the descriptor, `None` for plaintext.
pub(crate) fn connector_for(
    descriptor: &ConnectionDescriptor,
) -> Result<Option<Connector>, ProtocolError> {
    if !descriptor.is_secure() {
        return Ok(None);
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?;

    let config = if descriptor.skip_cert_validation() {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth()
    } else {
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots).with_no_client_auth()
    };

    Ok(Some(Connector::Rustls(Arc::new(config))))
}

/// Verifier that trusts any certificate but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
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
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_has_no_connector() {
        let descriptor = ConnectionDescriptor::new("localhost", 8080, "t");
        assert!(connector_for(&descriptor).unwrap().is_none());
    }

    #[test]
    fn secure_builds_rustls_connector() {
        let descriptor = ConnectionDescriptor::new("localhost", 4443, "t").with_secure(true);
        assert!(matches!(
            connector_for(&descriptor).unwrap(),
            Some(Connector::Rustls(_))
        ));
    }

    #[test]
    fn relaxed_builds_rustls_connector() {
        let descriptor = ConnectionDescriptor::new("localhost", 4443, "t")
            .with_secure(true)
            .with_skip_cert_validation(true);
        assert!(matches!(
            connector_for(&descriptor).unwrap(),
            Some(Connector::Rustls(_))
        ));
    }
}
