// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 不值得抓取的社交/视频平台
const DENIED_HOSTS: [&str; 5] = [
    "youtube.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "linkedin.com",
];

/// 判断 URL 是否值得抓取
///
/// 只检查主机部分是否包含黑名单中的平台域名。无法解析的 URL 没有主机，
/// 因此放行，由后续抓取阶段记录错误。
pub fn is_eligible(url: &str) -> bool {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .unwrap_or_default();

    !DENIED_HOSTS.iter().any(|denied| host.contains(denied))
}
