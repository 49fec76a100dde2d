// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub engine: String,
}

impl SearchResult {
    pub fn new(title: String, url: String, description: Option<String>, engine: String) -> Self {
        Self {
            title,
            url,
            description,
            engine,
        }
    }
}
