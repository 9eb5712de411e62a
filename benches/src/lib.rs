pub mod context;

/// Expressions exercised by the benchmarks, from trivial to heavily nested.
pub const EXPRESSIONS: &[(&str, &str)] = &[
    ("variable", "${title}"),
    ("arithmetic", "(${users[0].age} + 10) * 3 / 7 - ${users[1].age} % 5"),
    (
        "logic",
        "${users[0].is_disabled} or (${users[1].age} >= 30 and not ${users[2].is_disabled})",
    ),
    (
        "conditional",
        "${users[0].age} > 50 ? 'senior' : (${users[0].age} > 30 ? 'adult' : 'young')",
    ),
    ("substitution", "|Hello ${users[0].name}, you are ${users[0].age}!|"),
    ("default", "${users[0].nickname} ?: (${users[0].name} ?: 'anonymous')"),
];
