//! Certificate and CRL fixtures generated with rcgen.
//!
//! Shared with the integration tests through `tests/common`.

use rcgen::{
    BasicConstraints, CertificateParams, CertificateRevocationListParams, DistinguishedName,
    DnType, DnValue, IsCa, Issuer, KeyIdMethod, KeyPair, KeyUsagePurpose, RevocationReason,
    RevokedCertParams, SerialNumber,
};
use time::{Duration, OffsetDateTime};

pub fn at(unix_seconds: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(unix_seconds).unwrap()
}

pub struct TestAuthority {
    issuer: Issuer<'static, KeyPair>,
}

impl TestAuthority {
    pub fn new() -> Self {
        let mut params = CertificateParams::default();
        params.distinguished_name = DistinguishedName::new();
        params
            .distinguished_name
            .push(DnType::CommonName, "Test Root CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let key_pair = KeyPair::generate().unwrap();
        Self {
            issuer: Issuer::new(params, key_pair),
        }
    }

    pub fn issue(
        &self,
        common_name: &str,
        serial: &[u8],
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> String {
        let cn = DnValue::Utf8String(common_name.to_string());
        self.issue_with_cn(cn, serial, not_before, not_after)
    }

    /// Issues a certificate whose CN is encoded with the given string type.
    pub fn issue_with_cn(
        &self,
        common_name: DnValue,
        serial: &[u8],
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> String {
        let mut name = DistinguishedName::new();
        name.push(DnType::OrganizationName, "Example Org");
        name.push(DnType::CommonName, common_name);
        self.sign(name, serial, not_before, not_after)
    }

    pub fn issue_without_cn(
        &self,
        serial: &[u8],
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> String {
        let mut name = DistinguishedName::new();
        name.push(DnType::OrganizationName, "Example Org");
        self.sign(name, serial, not_before, not_after)
    }

    fn sign(
        &self,
        name: DistinguishedName,
        serial: &[u8],
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> String {
        let mut params = CertificateParams::default();
        params.distinguished_name = name;
        params.serial_number = Some(SerialNumber::from_slice(serial));
        params.not_before = not_before;
        params.not_after = not_after;
        let key_pair = KeyPair::generate().unwrap();
        params.signed_by(&key_pair, &self.issuer).unwrap().pem()
    }

    pub fn crl(&self, revoked: &[&[u8]]) -> String {
        let now = OffsetDateTime::now_utc();
        let params = CertificateRevocationListParams {
            this_update: now - Duration::hours(1),
            next_update: now + Duration::days(7),
            crl_number: SerialNumber::from(1u64),
            issuing_distribution_point: None,
            revoked_certs: revoked
                .iter()
                .map(|serial| RevokedCertParams {
                    serial_number: SerialNumber::from_slice(serial),
                    revocation_time: now - Duration::minutes(30),
                    reason_code: Some(RevocationReason::KeyCompromise),
                    invalidity_date: None,
                })
                .collect(),
            key_identifier_method: KeyIdMethod::Sha256,
        };
        params.signed_by(&self.issuer).unwrap().pem().unwrap()
    }
}
