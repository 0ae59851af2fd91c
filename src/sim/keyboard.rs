//! Key scripts.
//!
//! A script is a whitespace-separated list of `token[*count]` items, one key per
//! tick:
//!
//! ```text
//! right*3 none*20 up left*2 .*10
//! ```
//!
//! Tokens (case-insensitive): `up`/`u`, `down`/`d`, `left`/`l`, `right`/`r`,
//! `none`/`.`. Once the script runs out the keyboard reports no key.

use anyhow::{anyhow, Context, Result};
use std::collections::VecDeque;

use crate::device::{Key, Keyboard};

/// Parsed key script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyScript {
    keys: Vec<Option<Key>>,
}

impl KeyScript {
    pub fn parse(script: &str) -> Result<Self> {
        let mut keys = Vec::new();
        for item in script.split_whitespace() {
            let (token, count) = match item.split_once('*') {
                Some((token, count)) => {
                    let count: usize = count
                        .parse()
                        .with_context(|| format!("invalid repeat count in '{}'", item))?;
                    (token, count)
                }
                None => (item, 1),
            };
            let key = parse_token(token)?;
            keys.extend(std::iter::repeat(key).take(count));
        }
        Ok(Self { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn parse_token(token: &str) -> Result<Option<Key>> {
    match token.to_ascii_lowercase().as_str() {
        "up" | "u" => Ok(Some(Key::Up)),
        "down" | "d" => Ok(Some(Key::Down)),
        "left" | "l" => Ok(Some(Key::Left)),
        "right" | "r" => Ok(Some(Key::Right)),
        "none" | "." => Ok(None),
        other => Err(anyhow!("unknown key token '{}'", other)),
    }
}

/// Keyboard that plays back a `KeyScript`.
pub struct ScriptedKeyboard {
    pending: VecDeque<Option<Key>>,
    enabled: bool,
}

impl ScriptedKeyboard {
    pub fn new(script: KeyScript) -> Self {
        Self {
            pending: script.keys.into(),
            enabled: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Keyboard for ScriptedKeyboard {
    fn enable(&mut self, _sampling_period_ms: u32) {
        self.enabled = true;
    }

    fn get_key(&mut self) -> Option<Key> {
        if !self.enabled {
            return None;
        }
        self.pending.pop_front().flatten()
    }
}
