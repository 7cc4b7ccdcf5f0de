//! Canned replies to fixed trigger phrases.

use std::collections::HashMap;

const SILLY: &[(&str, &[&str])] = &[
    ("What happen ?", &["Somebody set up us the bomb."]),
    (
        "It's You !!",
        &[
            "How are you gentlemen !!",
            "All your base are belong to us.",
            "You are on the way to destruction.",
        ],
    ),
    (
        "What you say !!",
        &[
            "You have no chance to survive make your time.",
            "HA HA HA HA ....",
        ],
    ),
];

/// Built-in trigger phrases and their reply lines.
pub fn default_silly_triggers() -> HashMap<String, Vec<String>> {
    SILLY
        .iter()
        .map(|(trigger, lines)| {
            (
                trigger.to_string(),
                lines.iter().map(|l| l.to_string()).collect(),
            )
        })
        .collect()
}
