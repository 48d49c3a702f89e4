//! Seeded synthetic training set
//!
//! Noisy copies of a handful of well-known problems, plus heavily weighted
//! trivial statements that pin the bottom of the rating scale.

use crate::models::{DifficultyClass, LabeledSample, ProblemSample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Filler words spliced into anchor statements
pub const NOISE_WORDS: &[&str] = &[
    "the", "a", "of", "to", "in", "is", "for", "on", "with", "at", "by",
];

const INSERTIONS_PER_SAMPLE: usize = 5;
const SCORE_JITTER: f64 = 40.0;
const BASIC_REPEATS: usize = 20;
const BASIC_JITTER: f64 = 10.0;

/// Known problem used as a template for synthetic samples
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub title: &'static str,
    pub statement: &'static str,
    pub input: &'static str,
    pub output: &'static str,
    pub rating: i32,
    pub class: DifficultyClass,
}

pub const ANCHORS: &[Anchor] = &[
    Anchor {
        title: "Watermelon",
        statement: "divide a watermelon weighing w kilos into two parts, such that each part weighs an even number of kilos. Both parts must have a positive weight. determine if such a division is possible.",
        input: "one integer w",
        output: "YES or NO",
        rating: 800,
        class: DifficultyClass::Easy,
    },
    Anchor {
        title: "Way Too Long Words",
        statement: "automate the abbreviation of words. If a word's length is strictly greater than 10 characters, it should be replaced with an abbreviation. first letter, then number of letters between first and last, then last letter.",
        input: "number of words n, then n strings",
        output: "abbreviated words",
        rating: 800,
        class: DifficultyClass::Easy,
    },
    Anchor {
        title: "Next Round",
        statement: "contest with n participants, given scores and k. calculate how many participants will advance. score equal or greater than the k-th place participant. score must be positive.",
        input: "integers n and k, then n scores",
        output: "number of participants who advance",
        rating: 800,
        class: DifficultyClass::Easy,
    },
    Anchor {
        title: "Yarik and Array",
        statement: "finding maximum sum of a non-empty subarray where any two adjacent elements must have alternating parities, one even, one odd.",
        input: "t test cases, n integers",
        output: "maximum subarray sum",
        rating: 1100,
        class: DifficultyClass::Easy,
    },
    Anchor {
        title: "Queue Sort",
        statement: "Vlad has array of n integers and wants to sort in non-decreasing order. extract first element, insert at end, swap until strictly greater. minimum operations to sort or impossible -1.",
        input: "t test cases, n integers",
        output: "minimum operations or -1",
        rating: 1200,
        class: DifficultyClass::Medium,
    },
    Anchor {
        title: "Counting Graphs",
        statement: "given a weighted tree with n vertices. find number of weighted graphs such that maximum spanning tree is the same tree. weights are up to s. modulo 998244353.",
        input: "t test cases, n and s, then n-1 edges with weights",
        output: "number of graphs modulo 998244353",
        rating: 2000,
        class: DifficultyClass::Hard,
    },
    Anchor {
        title: "Minimum Spanning Tree",
        statement: "given a graph with n vertices and m edges. find the sum of weights of edges in the minimum spanning tree of the graph. using kruskal or prim.",
        input: "n and m, then m edges with weights u, v, w",
        output: "minimum weight sum",
        rating: 1600,
        class: DifficultyClass::Medium,
    },
    Anchor {
        title: "Directing Edges",
        statement: "given a graph with undirected and directed edges. find a way to direct undirected edges such that there are no cycles. print directions.",
        input: "t test cases, n and m, then m edges (type, u, v)",
        output: "YES/NO and the directed edges",
        rating: 1900,
        class: DifficultyClass::Medium,
    },
    Anchor {
        title: "Maximum Flow",
        statement: "given a flow network with source s and sink t. find the maximum amount of flow that can be sent from s to t using edmonds-karp or dinic algorithm.",
        input: "n vertices, m edges, vertex capacities",
        output: "maximum flow value",
        rating: 2400,
        class: DifficultyClass::Hard,
    },
    Anchor {
        title: "Bitmask DP Task",
        statement: "given n items each with cost and value. find maximum value to get with budget b. n is small around 20. use bitmasks.",
        input: "n and b, then n items",
        output: "maximum total value",
        rating: 2200,
        class: DifficultyClass::Hard,
    },
];

/// Trivial statements: (description, input, output, base score)
pub const BASIC_EASY: &[(&str, &str, &str, f64)] = &[
    ("add two numbers", "a b", "sum", 800.0),
    ("print the hello world", "none", "string", 800.0),
    ("find maximum of three", "x y z", "max", 850.0),
    ("check even or odd", "n", "label", 800.0),
];

/// `n` noisy anchor samples followed by the weighted trivial set
pub fn generate(n: usize, seed: u64) -> Vec<LabeledSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n + BASIC_EASY.len() * BASIC_REPEATS);

    for _ in 0..n {
        let anchor = ANCHORS[rng.gen_range(0..ANCHORS.len())];
        let mut words: Vec<&str> = anchor.statement.split(' ').collect();
        for _ in 0..INSERTIONS_PER_SAMPLE {
            let at = rng.gen_range(0..words.len());
            let noise = NOISE_WORDS.choose(&mut rng).copied().unwrap_or("the");
            words.insert(at, noise);
        }
        let score = anchor.rating as f64 + rng.gen_range(-SCORE_JITTER..SCORE_JITTER);
        samples.push(LabeledSample::new(
            ProblemSample::new(words.join(" "), anchor.input, anchor.output),
            anchor.class,
            score,
        ));
    }

    for &(description, input, output, base) in BASIC_EASY {
        for _ in 0..BASIC_REPEATS {
            samples.push(LabeledSample::new(
                ProblemSample::new(description, input, output),
                DifficultyClass::Easy,
                base + rng.gen_range(0.0..BASIC_JITTER),
            ));
        }
    }

    samples
}
