// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// A stable, non-empty identifier used in specs and their JSON form.
///
/// Ids are free-form otherwise: game ids are often derived from the game name in the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self { value, _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
        }
    }
}

impl std::error::Error for IdError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameIdTag {}
/// Key into a spec's game mapping.
pub type GameId = Id<GameIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionIdTag {}
pub type PositionId = Id<PositionIdTag>;

/// Issues `<base>-<n>` ids for the positions generated from one base position.
///
/// The counter advances once per call; the arguments only feed trace logging.
#[derive(Debug, Clone)]
pub struct IdGen {
    base: String,
    counter: usize,
}

impl IdGen {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into(), counter: 0 }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn next(&mut self, game_id: &GameId, initial: &str, fragment: &str) -> PositionId {
        let mut buf = itoa::Buffer::new();
        let mut value = String::with_capacity(self.base.len() + 4);
        value.push_str(&self.base);
        value.push('-');
        value.push_str(buf.format(self.counter));
        self.counter += 1;

        tracing::trace!(id = %value, game_id = %game_id, initial, fragment, "issued position id");

        // The dash and counter make the value non-empty.
        PositionId { value, _marker: PhantomData }
    }
}
