//! Keyword tiers and math markers

/// Operators, named functions and glyphs counted as mathematical content
pub const MATH_SYMBOLS: &[&str] = &[
    "+", "-", "*", "/", ">", "<", "=", "∑", "∏", "log", "exp", "sqrt", "%", "^", "!", "∞", "∫",
    "mod", "xor",
];

/// Tier names in the order their flags appear in the feature vector
pub const TIER_NAMES: [&str; 3] = ["simple", "medium", "hard"];

/// Three keyword lists, one per difficulty tier
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSet {
    pub simple: &'static [&'static str],
    pub medium: &'static [&'static str],
    pub hard: &'static [&'static str],
}

impl IndicatorSet {
    /// Per-tier match flags in simple, medium, hard order
    pub fn flags(&self, text: &str) -> [bool; 3] {
        [self.simple, self.medium, self.hard].map(|tier| tier.iter().any(|kw| text.contains(kw)))
    }
}

/// Lexical markers found in full statements
pub const STATEMENT_TIERS: IndicatorSet = IndicatorSet {
    simple: &[
        "sum", "print", "add", "number", "even", "odd", "easy", "positive", "calculate",
    ],
    medium: &[
        "sort", "binary", "greedy", "bfs", "dfs", "minimum", "maximum", "adjacency", "edge", "node",
    ],
    hard: &[
        "dp",
        "flow",
        "segment",
        "tree",
        "heavy",
        "decomposition",
        "bitmask",
        "centroid",
        "fft",
        "prime",
        "modulo",
        "spanning",
        "kruskal",
        "dinic",
        "network",
    ],
};

/// Markers matched against archive tag names
pub const TAG_TIERS: IndicatorSet = IndicatorSet {
    simple: &["implementation", "brute force", "math", "even", "odd", "sum"],
    medium: &["greedy", "binary search", "sort", "dfs", "bfs", "constructive"],
    hard: &[
        "dp",
        "graphs",
        "trees",
        "data structures",
        "string suffix",
        "flows",
        "geometry",
        "probabilities",
        "bitmask",
    ],
};

/// Non-overlapping occurrences of every math marker in `text`
pub fn count_math_symbols(text: &str) -> usize {
    MATH_SYMBOLS.iter().map(|sym| text.matches(sym).count()).sum()
}
