//! Input generation shared by the benchmarks.

use std::fmt::Write;

/// Blocks of statements in [`big_program`].
pub const BIG_PROGRAM_BLOCKS: usize = 2_000;

/// Builds a valid program exercising every statement kind, `blocks` times
/// over. Every variable name is unique, since the symbol table is flat.
pub fn program(blocks: usize) -> String {
    let mut src = String::from("use <iostream>;\nuse <string>;\n");
    for i in 0..blocks {
        write!(
            src,
            "\
number n{i} := {i};
lnumber l{i} := n{i} + 9000000000;
riel r{i} := l{i} + 0.5;
text t{i} := \"item \" + n{i} + \" is \\\"{i}\\\"\";
logic b{i} := r{i} ?= l{i};
// comment {i}
if (b{i}) says t{i};
else {{
    says \"ratio: \" + r{i};
    if (n{i} ?= {i}) says b{i};
}}
"
        )
        .expect("writing to a String can't fail");
    }
    src
}

pub fn big_program() -> String {
    program(BIG_PROGRAM_BLOCKS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_program_compiles() {
        let compilation = humanscript::pipeline::compile(&program(3)).unwrap();
        assert!(compilation.code.contains("std::string t2 ="));
    }
}
