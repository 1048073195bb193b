//! Transformation-selection state machine.
//!
//! Evaluated once per request:
//! 1. attack flag off ............ `Disabled`, byte-identical pass-through
//! 2. encrypted payload present .. `EncryptedOverride`, bit-flip forced
//! 3. otherwise .................. `PlainText(configured variant)`;
//!    an unrecognized configured variant passes through for this request
//!    only, without touching the global flag

use crate::config::AttackConfig;
use crate::detect::ProtocolState;
use crate::message::Message;

use super::types::{AttackType, Change};
use super::{address, encrypted, price, product};

/// Outcome of the per-request transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackDecision {
    /// No transformation; the message passes through unchanged.
    Disabled,
    /// The operator-configured plain-text variant applies.
    PlainText(AttackType),
    /// Encryption detected; the bit-flip is forced regardless of policy.
    EncryptedOverride,
}

/// A transformation that was actually applied.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub attack_type: AttackType,
    pub modified: Message,
    pub changes: Vec<Change>,
}

/// Picks and applies exactly one transformation variant per request.
/// Stateless apart from the immutable policy captured at startup.
#[derive(Debug, Clone)]
pub struct Selector {
    enabled: bool,
    configured: AttackType,
    price_multiplier: f64,
    attacker_wallet: String,
}

impl Selector {
    pub fn from_config(config: &AttackConfig) -> Self {
        Self {
            enabled: config.enabled,
            configured: config.attack_type,
            price_multiplier: config.price_multiplier,
            attacker_wallet: config.attacker_wallet.clone(),
        }
    }

    /// Run the transition rule for one request.
    pub fn decide(&self, protocol: &ProtocolState) -> AttackDecision {
        if !self.enabled {
            return AttackDecision::Disabled;
        }
        if protocol.encryption_present {
            return AttackDecision::EncryptedOverride;
        }
        match self.configured {
            AttackType::PriceManipulation
            | AttackType::AddressManipulation
            | AttackType::ProductSubstitution => AttackDecision::PlainText(self.configured),
            _ => AttackDecision::Disabled,
        }
    }

    /// Decide and apply. `None` means the message passes through
    /// unchanged and no audit event is emitted: attack disabled, variant
    /// unrecognized, or the selected variant found nothing to alter.
    pub fn apply(&self, message: &Message, protocol: &ProtocolState) -> Option<AttackOutcome> {
        let (attack_type, applied) = match self.decide(protocol) {
            AttackDecision::Disabled => return None,
            AttackDecision::EncryptedOverride => {
                (AttackType::EncryptedBitFlip, encrypted::apply(message)?)
            }
            AttackDecision::PlainText(variant) => {
                let applied = match variant {
                    AttackType::PriceManipulation => {
                        price::apply(message, self.price_multiplier, &self.attacker_wallet)
                    }
                    AttackType::AddressManipulation => {
                        address::apply(message, &self.attacker_wallet)
                    }
                    AttackType::ProductSubstitution => product::apply(message),
                    // unreachable per decide(), kept total
                    _ => return None,
                };
                (variant, applied)
            }
        };

        let (modified, changes) = applied;
        if changes.is_empty() {
            return None;
        }

        Some(AttackOutcome {
            attack_type,
            modified,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::codec::decode;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    fn selector(enabled: bool, configured: AttackType) -> Selector {
        Selector {
            enabled,
            configured,
            price_multiplier: 100.0,
            attacker_wallet: "0xATTACKER".to_string(),
        }
    }

    fn plain() -> ProtocolState {
        ProtocolState::default()
    }

    fn encrypted_state() -> ProtocolState {
        ProtocolState {
            encryption_present: true,
            ..ProtocolState::default()
        }
    }

    #[test]
    fn disabled_flag_wins_over_everything() {
        let s = selector(false, AttackType::PriceManipulation);
        assert_eq!(s.decide(&encrypted_state()), AttackDecision::Disabled);
        let msg = decode(br#"{"amount":100}"#).unwrap();
        assert!(s.apply(&msg, &plain()).is_none());
    }

    #[test]
    fn encryption_forces_bitflip_over_configured_variant() {
        let s = selector(true, AttackType::PriceManipulation);
        assert_eq!(s.decide(&encrypted_state()), AttackDecision::EncryptedOverride);

        let payload = BASE64.encode(b"sealed payment payload");
        let raw = format!(r#"{{"encryptedPayload":"{payload}","amount":100}}"#);
        let msg = decode(raw.as_bytes()).unwrap();

        let outcome = s.apply(&msg, &encrypted_state()).unwrap();
        assert_eq!(outcome.attack_type, AttackType::EncryptedBitFlip);
        // the plain-text variant must not have run
        assert_eq!(outcome.modified.get("amount"), msg.get("amount"));
    }

    #[test]
    fn encrypted_override_without_payload_field_passes_through() {
        let s = selector(true, AttackType::PriceManipulation);
        // type tag marked it encrypted but no payload field is populated
        let msg = decode(br#"{"type":"secure","amount":100}"#).unwrap();
        assert!(s.apply(&msg, &encrypted_state()).is_none());
    }

    #[test]
    fn plain_text_variant_applies() {
        let s = selector(true, AttackType::PriceManipulation);
        let msg = decode(br#"{"amount":100,"recipient":"0xAA"}"#).unwrap();
        let outcome = s.apply(&msg, &plain()).unwrap();
        assert_eq!(outcome.attack_type, AttackType::PriceManipulation);
        assert!(outcome.changes.len() >= 2);
    }

    #[test]
    fn configured_none_passes_through() {
        let s = selector(true, AttackType::None);
        assert_eq!(s.decide(&plain()), AttackDecision::Disabled);
        let msg = decode(br#"{"amount":100}"#).unwrap();
        assert!(s.apply(&msg, &plain()).is_none());
    }

    #[test]
    fn variant_with_no_targets_yields_no_outcome() {
        let s = selector(true, AttackType::AddressManipulation);
        let msg = decode(br#"{"amount":100}"#).unwrap();
        assert!(s.apply(&msg, &plain()).is_none());
    }
}
