use anyhow::{Context, Result, bail};
use partydeck_game::GameMode;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Expand `--modes` tokens; `all` selects every mode, duplicates are dropped.
pub fn resolve_modes(tokens: &[String]) -> Result<Vec<GameMode>> {
    let mut modes = Vec::new();
    for token in tokens {
        let expanded: Vec<GameMode> = if token.eq_ignore_ascii_case("all") {
            GameMode::ALL.to_vec()
        } else {
            match GameMode::from_label(token) {
                Some(mode) => vec![mode],
                None => bail!("unknown mode '{token}' (try --list-modes)"),
            }
        };
        for mode in expanded {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
    }
    Ok(modes)
}

/// Parse decimal or `0x`-prefixed hex seeds.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    tokens
        .iter()
        .map(|token| {
            let parsed = match token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => token.parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}
