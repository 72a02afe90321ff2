// Copyright 2026 cardsnap contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mocked card generator.
//!
//! Stands in for the AI backend: a small built-in knowledge base keyed by
//! naive topic keyword matching, cycled to the requested count. Replace
//! this module with a real client without touching the rendering pipeline.

use cardsnap_core::Card;

/// question / answer / tip triples.
type Entry = (&'static str, &'static str, &'static str);

const MATH: &[Entry] = &[
    (
        "二次函数 ax²+bx+c=0 的判别式是什么？",
        "Δ = b² - 4ac",
        "记忆口诀：判别式 Δ=b²-4ac，大于零有两不同实根",
    ),
    (
        "直线的倾斜角范围是多少？",
        "[0, π)",
        "注意：倾斜角为 90° 时斜率不存在",
    ),
    (
        "等差数列通项公式？",
        "an = a1 + (n-1)d",
        "a1 为首项，d 为公差",
    ),
];

const ENGLISH: &[Entry] = &[
    (
        "abandon 的中文含义？",
        "v. 放弃，遗弃；n. 放任",
        "联想记忆：a band on (一支乐队在...) -> 放弃演出",
    ),
    (
        "虚拟语气 if I were you 的用法？",
        "表示与现在事实相反的假设",
        "主句通常用 would/should/could/might + 动词原形",
    ),
];

/// Generate `count` cards for `topic`. Deterministic: the same parameters
/// always produce the same deck.
pub fn generate_cards(topic: &str, count: usize) -> Vec<Card> {
    let source = match_subject(topic);
    (0..count)
        .map(|i| {
            let id = i as u32 + 1;
            match source {
                Some(entries) => {
                    let (question, answer, tip) = entries[i % entries.len()];
                    Card {
                        id,
                        question: question.to_string(),
                        answer: answer.to_string(),
                        tip: tip.to_string(),
                        quote: None,
                    }
                }
                // No subject matched: template generic cards around the
                // topic itself.
                None => Card {
                    id,
                    question: format!("[{topic}] 知识点 {id}：核心概念定义？"),
                    answer: format!("关于 {topic} 的关键要素 {id}"),
                    tip: format!("掌握 {topic} 的这个点很重要"),
                    quote: None,
                },
            }
        })
        .collect()
}

fn match_subject(topic: &str) -> Option<&'static [Entry]> {
    if ["数学", "几何", "函数"].iter().any(|k| topic.contains(k)) {
        Some(MATH)
    } else if ["英语", "单词", "语法"].iter().any(|k| topic.contains(k)) {
        Some(ENGLISH)
    } else {
        None
    }
}
