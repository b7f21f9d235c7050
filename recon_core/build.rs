//! Build script: compiles the TOML reference tables in `data/` into Rust
//! statics so the tables are immutable and validated at build time.
//!
//! Output: `$OUT_DIR/reference_data.rs`, included by `src/reference/mod.rs`.

use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize)]
struct FrictionFile {
    condition: Vec<ConditionEntry>,
    surface: Vec<SurfaceEntry>,
}

#[derive(Deserialize)]
struct ConditionEntry {
    key: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Deserialize)]
struct SurfaceEntry {
    key: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    coefficient: Option<f64>,
    #[serde(default)]
    conditions: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct ReactionFile {
    profile: Vec<ProfileEntry>,
}

#[derive(Deserialize)]
struct ProfileEntry {
    tag: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    seconds: f64,
}

fn main() {
    println!("cargo:rerun-if-changed=data/friction.toml");
    println!("cargo:rerun-if-changed=data/reaction_times.toml");

    let friction: FrictionFile = read_toml("data/friction.toml");
    let reaction: ReactionFile = read_toml("data/reaction_times.toml");

    let mut out = String::with_capacity(8_192);
    out.push_str("// @generated by build.rs from data/*.toml. Do not edit.\n\n");
    write_friction(&mut out, &friction);
    write_reaction(&mut out, &reaction);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest = Path::new(&out_dir).join("reference_data.rs");
    fs::write(&dest, out).expect("failed to write reference_data.rs");
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &str) -> T {
    let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    toml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}

fn string_slice(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("{:?}", s)).collect();
    format!("&[{}]", quoted.join(", "))
}

fn check_mu(key: &str, mu: f64) {
    if !(mu > 0.0 && mu <= 1.0) {
        panic!("friction coefficient for '{key}' must be in (0, 1], got {mu}");
    }
}

fn write_friction(out: &mut String, file: &FrictionFile) {
    let condition_keys: Vec<&str> = file.condition.iter().map(|c| c.key.as_str()).collect();

    out.push_str("pub mod friction_data {\n");
    out.push_str("    use crate::reference::{ConditionRecord, SurfaceRecord};\n\n");

    out.push_str("    pub static CONDITIONS: &[ConditionRecord] = &[\n");
    for c in &file.condition {
        let _ = writeln!(
            out,
            "        ConditionRecord {{ key: {:?}, name: {:?}, aliases: {} }},",
            c.key,
            c.name,
            string_slice(&c.aliases)
        );
    }
    out.push_str("    ];\n\n");

    out.push_str("    pub static SURFACES: &[SurfaceRecord] = &[\n");
    for s in &file.surface {
        if s.coefficient.is_none() && s.conditions.is_empty() {
            panic!("surface '{}' has neither a coefficient nor conditions", s.key);
        }
        let _ = writeln!(
            out,
            "        SurfaceRecord {{ key: {:?}, name: {:?}, aliases: {} }},",
            s.key,
            s.name,
            string_slice(&s.aliases)
        );
    }
    out.push_str("    ];\n\n");

    out.push_str("    pub static COEFFICIENTS: &[(&str, f64)] = &[\n");
    for s in &file.surface {
        for (condition, mu) in &s.conditions {
            if !condition_keys.contains(&condition.as_str()) {
                panic!("surface '{}' uses undeclared condition '{}'", s.key, condition);
            }
            let key = format!("{}_{}", s.key, condition);
            check_mu(&key, *mu);
            let _ = writeln!(out, "        ({:?}, {:?}),", key, mu);
        }
        if let Some(mu) = s.coefficient {
            check_mu(&s.key, mu);
            let _ = writeln!(out, "        ({:?}, {:?}),", s.key, mu);
        }
    }
    out.push_str("    ];\n");
    out.push_str("}\n\n");
}

fn write_reaction(out: &mut String, file: &ReactionFile) {
    let mut previous = 0.0_f64;
    for p in &file.profile {
        if p.seconds <= previous {
            panic!(
                "reaction profile '{}' ({} s) must be slower than the previous profile ({} s)",
                p.tag, p.seconds, previous
            );
        }
        previous = p.seconds;
    }

    out.push_str("pub mod reaction_data {\n");
    out.push_str("    use crate::reference::ProfileRecord;\n\n");
    out.push_str("    pub static PROFILES: &[ProfileRecord] = &[\n");
    for p in &file.profile {
        let _ = writeln!(
            out,
            "        ProfileRecord {{ tag: {:?}, name: {:?}, aliases: {}, seconds: {:?} }},",
            p.tag,
            p.name,
            string_slice(&p.aliases),
            p.seconds
        );
    }
    out.push_str("    ];\n");
    out.push_str("}\n");
}
