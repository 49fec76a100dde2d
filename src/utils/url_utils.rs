// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 从 URL 生成简单的站点标题
///
/// 取主机名，去掉 `www.`、`.com`、`.in` 后按单词首字母大写；
/// 没有主机名时返回 "Unknown"。
pub fn title_from_url(url: &str) -> String {
    let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host,
        None => return "Unknown".to_string(),
    };

    let stripped = host
        .replace("www.", "")
        .replace(".com", "")
        .replace(".in", "");
    title_case(&stripped)
}

/// 每个字母段的首字母大写，其余小写
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
