//! Capability tokens binding one document and one export kind to a time-limited signature.
//!
//! A token is the HMAC-SHA256 of `(document id, export kind, expiry millis)` under a single
//! process-wide secret, encoded as unpadded URL-safe base64. Validity is recomputed entirely
//! from the request plus the secret; nothing is persisted server-side. Both the token and the
//! expiry travel as URL query parameters and both are covered by the signature, so tampering
//! with either invalidates the link.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, error::ConfigError, itinerary::DocumentId, render::ExportKind};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the shared signing secret.
pub const SECRET_ENV_VAR: &str = "ITINERARY_EXPORT_SECRET";

/// Redacted signing secret wrapper keeping key material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);
impl SigningSecret {
	/// Wraps new secret material, rejecting empty strings.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		if value.is_empty() {
			return Err(ConfigError::EmptySecret);
		}

		Ok(Self(value))
	}

	/// Loads the secret from [`SECRET_ENV_VAR`].
	///
	/// This is the fatal-at-startup path: an absent or empty variable means the export
	/// pipeline must not come up at all.
	pub fn from_env() -> Result<Self, ConfigError> {
		match std::env::var(SECRET_ENV_VAR) {
			Ok(value) => Self::new(value),
			Err(_) => Err(ConfigError::MissingSecret { var: SECRET_ENV_VAR }),
		}
	}

	/// Returns the inner key material. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
	}
}
impl Display for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Reason a capability token was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenRejection {
	/// The expiry instant has passed.
	Expired,
	/// The expiry parameter is not a well-formed epoch-milliseconds timestamp.
	InvalidFormat,
	/// The supplied token does not match the recomputed digest.
	InvalidSignature,
}
impl TokenRejection {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenRejection::Expired => "expired",
			TokenRejection::InvalidFormat => "invalid_format",
			TokenRejection::InvalidSignature => "invalid_signature",
		}
	}
}
impl Display for TokenRejection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token plus expiry pair produced by [`TokenSigner::sign`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedGrant {
	/// Unpadded URL-safe base64 encoding of the HMAC output.
	pub token: String,
	/// Instant the grant stops being valid.
	pub expires_at: OffsetDateTime,
}
impl SignedGrant {
	/// Expiry as the epoch-milliseconds integer embedded in export URLs.
	pub fn expires_at_millis(&self) -> i64 {
		unix_millis(self.expires_at)
	}
}

/// Signs and verifies export capability tokens.
///
/// Pure function of its inputs plus the secret loaded once at startup; cheap to clone and
/// share across requests.
#[derive(Clone)]
pub struct TokenSigner {
	mac: HmacSha256,
}
impl TokenSigner {
	/// How long a signed grant stays valid.
	pub const VALIDITY_WINDOW: Duration = Duration::minutes(5);

	/// Creates a signer keyed by the provided secret.
	pub fn new(secret: SigningSecret) -> Self {
		// HMAC keys may be any length.
		let mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
			.expect("HMAC key setup accepts any length.");

		Self { mac }
	}

	/// Creates a signer from [`SECRET_ENV_VAR`], failing when the secret is absent.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self::new(SigningSecret::from_env()?))
	}

	/// Signs an export grant expiring [`Self::VALIDITY_WINDOW`] from now.
	pub fn sign(&self, id: &DocumentId, kind: ExportKind) -> SignedGrant {
		self.sign_at(id, kind, OffsetDateTime::now_utc())
	}

	/// Signs an export grant as if issued at the provided instant.
	///
	/// Deterministic variant used by tests and replay tooling.
	pub fn sign_at(&self, id: &DocumentId, kind: ExportKind, issued_at: OffsetDateTime) -> SignedGrant {
		let expires_at = issued_at + Self::VALIDITY_WINDOW;
		let token = self.digest(id, kind, unix_millis(expires_at));

		SignedGrant { token, expires_at }
	}

	/// Verifies a token against the recomputed digest for `(id, kind, expires)`.
	pub fn verify(
		&self,
		id: &DocumentId,
		kind: ExportKind,
		token: &str,
		expires: &str,
	) -> Result<(), TokenRejection> {
		self.verify_at(id, kind, token, expires, OffsetDateTime::now_utc())
	}

	/// Verifies a token treating the provided instant as "now".
	///
	/// `expires` is the raw epoch-milliseconds query parameter; anything that does not parse
	/// as an integer is rejected as [`TokenRejection::InvalidFormat`] before any digest work.
	/// The digest comparison itself is constant-time and never returns early on the first
	/// mismatching byte.
	pub fn verify_at(
		&self,
		id: &DocumentId,
		kind: ExportKind,
		token: &str,
		expires: &str,
		now: OffsetDateTime,
	) -> Result<(), TokenRejection> {
		let expires_millis =
			expires.trim().parse::<i64>().map_err(|_| TokenRejection::InvalidFormat)?;

		if unix_millis(now) > expires_millis {
			return Err(TokenRejection::Expired);
		}

		let supplied = URL_SAFE_NO_PAD
			.decode(token.as_bytes())
			.map_err(|_| TokenRejection::InvalidSignature)?;
		let mut mac = self.mac.clone();

		mac.update(message(id, kind, expires_millis).as_bytes());
		mac.verify_slice(&supplied).map_err(|_| TokenRejection::InvalidSignature)
	}

	fn digest(&self, id: &DocumentId, kind: ExportKind, expires_millis: i64) -> String {
		let mut mac = self.mac.clone();

		mac.update(message(id, kind, expires_millis).as_bytes());

		URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
	}
}
impl Debug for TokenSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSigner").field("secret", &"<redacted>").finish()
	}
}

fn message(id: &DocumentId, kind: ExportKind, expires_millis: i64) -> String {
	format!("{id}\n{kind}\n{expires_millis}")
}

fn unix_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn signer() -> TokenSigner {
		TokenSigner::new(SigningSecret::new("unit-test-secret").expect("Secret should be valid."))
	}

	fn doc(id: &str) -> DocumentId {
		DocumentId::new(id).expect("Document identifier fixture should be valid.")
	}

	#[test]
	fn sign_verify_round_trip() {
		let signer = signer();
		let id = doc("abc123");
		let issued = datetime!(2026-02-20 10:00 UTC);
		let grant = signer.sign_at(&id, ExportKind::Text, issued);

		signer
			.verify_at(&id, ExportKind::Text, &grant.token, &grant.expires_at_millis().to_string(), issued)
			.expect("Freshly signed grant should verify.");
	}

	#[test]
	fn expiry_is_monotonic() {
		let signer = signer();
		let id = doc("abc123");
		let issued = datetime!(2026-02-20 10:00 UTC);
		let grant = signer.sign_at(&id, ExportKind::Pdf, issued);
		let expires = grant.expires_at_millis().to_string();

		signer
			.verify_at(&id, ExportKind::Pdf, &grant.token, &expires, issued + Duration::minutes(4))
			.expect("Grant should verify inside the validity window.");

		let rejection = signer
			.verify_at(&id, ExportKind::Pdf, &grant.token, &expires, issued + Duration::minutes(6))
			.expect_err("Grant should be rejected after the validity window.");

		assert_eq!(rejection, TokenRejection::Expired);
	}

	#[test]
	fn token_is_tamper_sensitive() {
		let signer = signer();
		let id = doc("abc123");
		let issued = datetime!(2026-02-20 10:00 UTC);
		let grant = signer.sign_at(&id, ExportKind::Excel, issued);
		let expires = grant.expires_at_millis().to_string();

		// Flip every character position in turn; all must fail.
		for position in 0..grant.token.len() {
			let mut tampered: Vec<char> = grant.token.chars().collect();

			tampered[position] = if tampered[position] == 'A' { 'B' } else { 'A' };

			let tampered: String = tampered.into_iter().collect();

			assert_eq!(
				signer.verify_at(&id, ExportKind::Excel, &tampered, &expires, issued),
				Err(TokenRejection::InvalidSignature),
				"Tampered token at position {position} should be rejected.",
			);
		}
	}

	#[test]
	fn shifted_expiry_invalidates_signature() {
		let signer = signer();
		let id = doc("abc123");
		let issued = datetime!(2026-02-20 10:00 UTC);
		let grant = signer.sign_at(&id, ExportKind::Text, issued);
		let shifted = (grant.expires_at_millis() + 1).to_string();

		assert_eq!(
			signer.verify_at(&id, ExportKind::Text, &grant.token, &shifted, issued),
			Err(TokenRejection::InvalidSignature),
		);
	}

	#[test]
	fn grant_is_bound_to_document_and_kind() {
		let signer = signer();
		let issued = datetime!(2026-02-20 10:00 UTC);
		let grant = signer.sign_at(&doc("abc123"), ExportKind::Text, issued);
		let expires = grant.expires_at_millis().to_string();

		assert!(
			signer
				.verify_at(&doc("other-doc"), ExportKind::Text, &grant.token, &expires, issued)
				.is_err(),
		);
		assert!(
			signer
				.verify_at(&doc("abc123"), ExportKind::Pdf, &grant.token, &expires, issued)
				.is_err(),
		);
	}

	#[test]
	fn malformed_expiry_is_rejected_before_digest_work() {
		let signer = signer();
		let id = doc("abc123");

		assert_eq!(
			signer.verify(&id, ExportKind::Text, "whatever", "not-a-timestamp"),
			Err(TokenRejection::InvalidFormat),
		);
	}

	#[test]
	fn secret_formatters_redact() {
		let secret = SigningSecret::new("super-secret").expect("Secret should be valid.");

		assert_eq!(format!("{secret:?}"), "SigningSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert!(!format!("{:?}", signer()).contains("unit-test-secret"));
	}

	#[test]
	fn empty_and_missing_secrets_fail_startup() {
		assert!(SigningSecret::new("").is_err());
		// The variable is never set in the test environment.
		assert!(matches!(
			SigningSecret::from_env(),
			Err(crate::error::ConfigError::MissingSecret { var: SECRET_ENV_VAR }),
		));
	}
}
