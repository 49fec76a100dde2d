// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 从搜索结果中排除的目录/点评类站点
const EXCLUDED_SITES: [&str; 6] = [
    "zomato.com",
    "swiggy.com",
    "justdial.com",
    "tripadvisor.com",
    "facebook.com",
    "instagram.com",
];

/// 排除的 URL 路径片段
const EXCLUDED_PATHS: [&str; 3] = ["/search", "/tag/", "/categories/"];

/// 构造行业 + 地点的搜索指令（dork）
///
/// 两个词都加引号精确匹配，限定 `.in`/`.com` 站点，并排除聚合站点、
/// 列表页和菜单页。
pub fn build_dork(niche: &str, location: &str) -> String {
    let mut query = format!(r#""{}" "{}" site:.in OR site:.com"#, niche, location);
    for site in EXCLUDED_SITES {
        query.push_str(" -site:");
        query.push_str(site);
    }
    for path in EXCLUDED_PATHS {
        query.push_str(&format!(r#" -inurl:"{}""#, path));
    }
    query.push_str(r#" -intitle:"menu""#);
    query
}

/// 导出摘要中展示的查询文本
pub fn display_query(niche: &str, location: &str) -> String {
    format!(r#""{}" "{}""#, niche, location)
}
