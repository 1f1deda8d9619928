//! Reversible share codes for campaign seeds.
//! Code format: <MODE>-<WORD><NN>, e.g. ST-FALLOUT42, BR-SILO07

use crate::state::GameMode;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const WORD_LIST: [&str; 64] = [
    "FALLOUT", "SILO", "BUNKER", "DEFCON", "MISSILE", "WARHEAD", "TREATY", "SUMMIT", "EMBASSY",
    "CIPHER", "HOTLINE", "RADAR", "SATELIT", "BOMBER", "SUBMAR", "CARRIER", "URANIUM", "REACTOR",
    "ISOTOPE", "PLUTON", "ORBIT", "ROCKET", "LAUNCH", "ABORT", "STANDBY", "ALERT", "BRINK",
    "DETENTE", "BLOC", "CURTAIN", "WALL", "BORDER", "ENVOY", "CONSUL", "SPY", "MOLE", "DEFECT",
    "DOSSIER", "CABLE", "SIGNAL", "STATIC", "GRID", "VIRUS", "LAB", "VACCINE", "HARVEST", "OIL",
    "STEEL", "FACTORY", "UNION", "STRIKE", "RALLY", "BALLOT", "JUNTA", "COUP", "SENATE", "KREMLIN",
    "PENTAGN", "ATLAS", "TITAN", "POLARIS", "SENTRY", "BEACON", "DAWN",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

const fn mode_prefix(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Standard => "ST",
        GameMode::Brinkmanship => "BR",
    }
}

fn compose_seed(mode: GameMode, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 10];
    buf[..6].copy_from_slice(b"BRINK-");
    buf[6] = if mode.is_brinkmanship() { b'B' } else { b'S' };
    buf[7] = (packed & 0xFF) as u8;
    buf[8] = (packed >> 8) as u8;
    buf[9] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

#[must_use]
pub fn encode_friendly(mode: GameMode, seed: u64) -> String {
    let packed = (seed & 0xFFFF) as u16;
    let (wi, nn) = unpack(packed);
    let word = WORD_LIST[usize::from(wi) % WORD_LIST.len()];
    format!("{}-{word}{:02}", mode_prefix(mode), nn % 100)
}

/// Recover the mode and a seed from a share code. The seed re-encodes to
/// the same code.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<(GameMode, u64)> {
    let s = code.trim();
    let (m, rest) = s.split_once('-')?;
    let mode = match m.to_ascii_uppercase().as_str() {
        "ST" => GameMode::Standard,
        "BR" => GameMode::Brinkmanship,
        _ => return None,
    };
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some((mode, compose_seed(mode, wi, nn)))
}

#[must_use]
pub fn generate_code_from_entropy(mode: GameMode, entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_friendly(mode, compose_seed(mode, wi, nn))
}

/// Parse a share code into `GameMode` and seed
#[must_use]
pub fn parse_share_code(code: &str) -> Option<(GameMode, u64)> {
    decode_to_seed(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_code() {
        let code = encode_friendly(GameMode::Brinkmanship, 0xDEAD_BEEF_CAFE_BABE);
        let (mode, seed) = decode_to_seed(&code).unwrap();
        assert_eq!(mode, GameMode::Brinkmanship);
        assert_eq!(encode_friendly(mode, seed), code);
    }

    #[test]
    fn st_fallout_42_stable() {
        let (mode, seed) = decode_to_seed("ST-FALLOUT42").unwrap();
        assert_eq!(mode, GameMode::Standard);
        assert_eq!(encode_friendly(mode, seed), "ST-FALLOUT42");
        assert_eq!(decode_to_seed("st-fallout42"), Some((mode, seed)));
    }

    #[test]
    fn modes_separate_seeds() {
        let (_, standard) = parse_share_code("ST-SILO07").unwrap();
        let (mode, brink) = parse_share_code("BR-SILO07").unwrap();
        assert_eq!(mode, GameMode::Brinkmanship);
        assert_ne!(standard, brink);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert!(parse_share_code("XX-SILO07").is_none());
        assert!(parse_share_code("ST-NOTAWORD07").is_none());
        assert!(parse_share_code("ST-SILO").is_none());
        assert!(parse_share_code("SILO07").is_none());
    }

    #[test]
    fn entropy_codes_are_valid() {
        for entropy in [0_u64, 1, 99, u64::MAX] {
            let code = generate_code_from_entropy(GameMode::Standard, entropy);
            assert!(decode_to_seed(&code).is_some(), "{code}");
        }
    }
}
