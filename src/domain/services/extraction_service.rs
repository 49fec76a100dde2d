// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeSet;

use crate::domain::models::scrape_result::{ScrapeResult, SocialLinks};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // +91 followed by a 10-digit mobile number
        r"\+91[-\s]?[6-9]\d{9}",
        // 91 prefix without the plus sign
        r"91[-\s]?[6-9]\d{9}",
        // Bare 10-digit mobile number
        r"[6-9]\d{9}",
        // US style: (555) 123-4567
        r"\([0-9]{3}\)[-\s]?[0-9]{3}[-\s]?[0-9]{4}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid phone regex"))
    .collect()
});

static SOCIAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://(?:www\.)?(?:facebook|instagram)\.com/[^\s<>"]*"#)
        .expect("valid social link regex")
});

/// 含有这些片段的邮箱视为占位或无人值守地址
const SPAM_EMAIL_MARKERS: [&str; 6] = [
    "example.com",
    "test.com",
    "dummy.com",
    "noreply",
    "support",
    "info",
];

/// 不计入可见文本的元素
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// 块级元素，前后各以一个空格与相邻文本分隔
const BLOCK_ELEMENTS: [&str; 36] = [
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "figcaption", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr",
    "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "title",
    "tr", "ul",
];

const MIN_PHONE_LEN: usize = 10;
const PLACEHOLDER_DIGIT_RUN: usize = 6;

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(chunk) => out.push_str(chunk),
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(el) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    push_separator(out);
                }
                collect_text(child_element, out);
                if block {
                    push_separator(out);
                }
            }
            _ => {}
        }
    }
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// 提取服务
///
/// 负责从页面 HTML 中提取邮箱、电话和社交主页链接。提取本身不会失败：
/// 格式错误的 HTML 只会得到空集合。
pub struct ExtractionService;

impl ExtractionService {
    /// 从页面内容中提取联系信息
    pub fn extract(markup: &str, source_url: &str) -> ScrapeResult {
        let text = Self::visible_text(markup);

        ScrapeResult {
            url: source_url.to_string(),
            emails: Self::extract_emails(&text),
            phones: Self::extract_phones(&text),
            social_links: Self::extract_social_links(markup),
            error: None,
        }
    }

    /// 去掉标签，只保留可见文本
    ///
    /// 行内元素中的文本直接拼接（`<span>98765</span><span>43210</span>` 得到
    /// `9876543210`），块级元素边界处插入一个空格。
    pub fn visible_text(markup: &str) -> String {
        let document = Html::parse_document(markup);
        let mut text = String::with_capacity(markup.len() / 2);
        collect_text(document.root_element(), &mut text);
        text
    }

    pub fn extract_emails(text: &str) -> BTreeSet<String> {
        EMAIL_REGEX
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|email| {
                let lower = email.to_lowercase();
                !SPAM_EMAIL_MARKERS.iter().any(|marker| lower.contains(marker))
            })
            .map(str::to_string)
            .collect()
    }

    pub fn extract_phones(text: &str) -> BTreeSet<String> {
        PHONE_REGEXES
            .iter()
            .flat_map(|regex| regex.find_iter(text).map(|m| m.as_str()))
            .filter(|phone| phone.chars().count() >= MIN_PHONE_LEN)
            .filter(|phone| !starts_with_repeated_digit(phone))
            .map(str::to_string)
            .collect()
    }

    pub fn extract_social_links(markup: &str) -> SocialLinks {
        let links: BTreeSet<&str> = SOCIAL_REGEX.find_iter(markup).map(|m| m.as_str()).collect();

        let mut social = SocialLinks::default();
        for link in links {
            if link.contains("facebook.com") {
                social.facebook.insert(link.to_string());
            }
            if link.contains("instagram.com") {
                social.instagram.insert(link.to_string());
            }
        }
        social
    }
}

/// 号码是否以 6 个以上相同数字开头（如 "0000000000"）
fn starts_with_repeated_digit(phone: &str) -> bool {
    let mut chars = phone.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_digit() {
        return false;
    }
    1 + chars.take_while(|c| *c == first).count() >= PLACEHOLDER_DIGIT_RUN
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod extraction_service_test;
