use anyhow::{Context, Result, bail};
use brink_game::seed::WORD_LIST;
use brink_game::{GameMode, encode_friendly, parse_share_code};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1962;
/// Largest `a..b` range accepted on the command line.
const MAX_RANGE_LEN: u64 = 10_000;

/// Where a seed came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOrigin {
    Numeric,
    ShareCode { mode: GameMode, code: String },
}

/// A campaign seed plus the share code it was typed as, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub origin: SeedOrigin,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            origin: SeedOrigin::Numeric,
        }
    }

    /// Parse a share code such as `BR-FALLOUT42`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let (mode, seed) = parse_share_code(code)?;
        Some(Self {
            seed,
            origin: SeedOrigin::ShareCode {
                mode,
                code: code.trim().to_ascii_uppercase(),
            },
        })
    }

    #[must_use]
    pub const fn source_mode(&self) -> Option<GameMode> {
        match &self.origin {
            SeedOrigin::Numeric => None,
            SeedOrigin::ShareCode { mode, .. } => Some(*mode),
        }
    }

    /// Share codes pin their mode; bare numbers run in every mode.
    #[must_use]
    pub fn matches_mode(&self, mode: GameMode) -> bool {
        self.source_mode().is_none_or(|source| source == mode)
    }

    #[must_use]
    pub fn share_code_for_mode(&self, mode: GameMode) -> String {
        match &self.origin {
            SeedOrigin::ShareCode { mode: source, code } if *source == mode => code.clone(),
            _ => encode_friendly(mode, self.seed),
        }
    }
}

fn parse_range(token: &str) -> Option<Result<Vec<SeedInfo>>> {
    let (start, end) = token.split_once("..")?;
    let parsed = start
        .trim()
        .parse::<u64>()
        .and_then(|start| end.trim().parse::<u64>().map(|end| (start, end)));
    Some(parsed.context("seed ranges look like 100..120").and_then(|(start, end)| {
        if end <= start || end - start > MAX_RANGE_LEN {
            bail!("seed range {token} must be ascending and at most {MAX_RANGE_LEN} long");
        }
        Ok((start..end).map(SeedInfo::from_numeric).collect())
    }))
}

fn parse_token(token: &str) -> Result<Vec<SeedInfo>> {
    if token.eq_ignore_ascii_case("all") {
        return Ok(every_share_code());
    }
    if let Some(range) = parse_range(token) {
        return range;
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(vec![SeedInfo::from_numeric(value.unsigned_abs())]);
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(vec![SeedInfo::from_numeric(value)]);
    }
    SeedInfo::from_code(token)
        .map(|info| vec![info])
        .with_context(|| format!("Unrecognized seed token: {token}"))
}

/// Resolve CLI seed arguments: integers (negatives use their magnitude),
/// `a..b` ranges, share codes, and `all` for every share code in both
/// modes. Duplicates collapse; an empty list yields the default seed.
///
/// # Errors
///
/// Fails on tokens that are none of the above.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut seen: HashSet<(u64, Option<GameMode>)> = HashSet::new();
    let mut resolved = Vec::new();
    for token in tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        for info in parse_token(token)? {
            if seen.insert((info.seed, info.source_mode())) {
                resolved.push(info);
            }
        }
    }
    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }
    Ok(resolved)
}

fn every_share_code() -> Vec<SeedInfo> {
    WORD_LIST
        .iter()
        .flat_map(|word| (0..100).map(move |n| (word, n)))
        .flat_map(|(word, n)| {
            ["ST", "BR"]
                .into_iter()
                .filter_map(move |prefix| SeedInfo::from_code(&format!("{prefix}-{word}{n:02}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numbers_and_share_codes() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "br-fallout42"])).unwrap();
        assert_eq!(seeds[0], SeedInfo::from_numeric(42));
        assert_eq!(seeds[1], SeedInfo::from_numeric(7));
        let coded = &seeds[2];
        assert_eq!(coded.source_mode(), Some(GameMode::Brinkmanship));
        assert!(!coded.matches_mode(GameMode::Standard));
        assert_eq!(coded.share_code_for_mode(GameMode::Brinkmanship), "BR-FALLOUT42");
        assert_ne!(coded.share_code_for_mode(GameMode::Standard), "BR-FALLOUT42");
    }

    #[test]
    fn ranges_expand_and_duplicates_collapse() {
        let seeds = resolve_seed_inputs(&tokens(&["3..6", "4", " "])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![3, 4, 5]);
        assert!(resolve_seed_inputs(&tokens(&["6..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["1..x"])).is_err());
    }

    #[test]
    fn empty_input_uses_default_seed() {
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(DEFAULT_SEED)]);
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = resolve_seed_inputs(&tokens(&["not-a-seed!"])).unwrap_err();
        assert!(err.to_string().contains("not-a-seed!"));
    }

    #[test]
    fn all_expands_every_share_code() {
        let seeds = resolve_seed_inputs(&tokens(&["all"])).unwrap();
        assert_eq!(seeds.len(), WORD_LIST.len() * 100 * 2);
        assert!(seeds.iter().all(|s| s.source_mode().is_some()));
    }
}
