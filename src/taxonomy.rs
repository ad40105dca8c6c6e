//! ニュースカテゴリの固定タクソノミ。
use std::fmt;

use serde::{Deserialize, Serialize};

/// 分類対象の12カテゴリ。宣言順がそのまま序数となり、
/// スコアが同点の場合は序数が小さいカテゴリが優先される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    Business,
    Education,
    Entertainment,
    Finance,
    Health,
    Legal,
    Lifestyle,
    Politics,
    Science,
    Sports,
    Technology,
    World,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Business,
        Category::Education,
        Category::Entertainment,
        Category::Finance,
        Category::Health,
        Category::Legal,
        Category::Lifestyle,
        Category::Politics,
        Category::Science,
        Category::Sports,
        Category::Technology,
        Category::World,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Finance => "Finance",
            Category::Health => "Health",
            Category::Legal => "Legal",
            Category::Lifestyle => "Lifestyle",
            Category::Politics => "Politics",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
            Category::World => "World",
        }
    }

    /// `ALL` 内での位置。モデル成果物の行列行や同点判定に使う。
    #[must_use]
    pub fn ordinal(self) -> usize {
        Category::ALL
            .iter()
            .position(|category| *category == self)
            .expect("category is declared in ALL")
    }

    /// ラベル文字列をカテゴリに解決する。大文字小文字は無視する。
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
