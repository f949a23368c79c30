//! Parser tests.

use crate::prelude::{parse::*, *};

use crate::{interp, ms};

fn run<T>(input: impl AsRef<str>, action: impl FnOnce(&str) -> Res<T>, expected: Result<&str, &str>)
where
    T: fmt::Display,
{
    let input = input.as_ref();
    println!("input:");
    for line in input.lines() {
        println!("    {}", line);
    }
    let res = action(input)
        .map(|t| t.to_string())
        .map_err(|e| e.to_string());
    println!("result: {:?}", res);
    match expected {
        Ok(exp) => assert_eq!(res.as_ref().map(|s| s as &str), Ok(exp)),
        Err(exp) => assert_eq!(res.as_ref().map_err(|s| s as &str), Err(exp)),
    }
}

#[test]
fn reactions() {
    run("A + B -> C", crn, Ok("A + B -> C"));
    run("A+B->C", crn, Ok("A + B -> C"));
    run("2A -> 3 B + i", crn, Ok("A + A -> B + B + B + i"));
    run("A <=> i; i -> ", crn, Ok("A <=> i\ni ->"));
    run("-> A", crn, Ok("-> A"));
    run("A ⇌ B; B → C", crn, Ok("A <=> B\nB -> C"));
    run("A -> B [k = 2.5]", crn, Ok("A -> B [k = 2.5]"));
    run(
        "A <=> B [kf = 1e3, kr = 2]",
        crn,
        Ok("A <=> B [kf = 1000, kr = 2]"),
    );
}

#[test]
fn comments_and_blank_lines() {
    run(
        "\
# formal reactions
A + B -> C   # first

; ;
C -> A # second
",
        crn,
        Ok("A + B -> C\nC -> A"),
    );
    run("", crn, Ok(""));
    run("# nothing", crn, Ok(""));
}

#[test]
fn errors() {
    run(
        "A + B -> C\nA + -> B",
        crn,
        Err("error @2:5: `A + -> B`, expected one of species name, stoichiometric coefficient"),
    );
    run(
        "A B",
        crn,
        Err("error @1:3: `A B`, expected one of \"+\", `->` or `<=>`"),
    );
}

#[test]
fn interpretations() {
    let m = interpretation("i1 -> A; i2 -> A + 2 B\nw ->").unwrap();
    assert_eq!(m, interp!(i1 => [A], i2 => [A, B * 2], w => []));

    let m = interpretation("x: A\n# comment\ny => B").unwrap();
    assert_eq!(m, interp!(x => [A], y => [B]));

    run(
        "x -> A\nx -> B",
        interpretation,
        Err("error @2:1: `x -> B`, species `x` is interpreted twice"),
    );
}

#[test]
fn species_lists() {
    let fs = species_list("A, B C\nD").unwrap();
    let expected: Set<Species> = vec!["A", "B", "C", "D"]
        .into_iter()
        .map(Species::new)
        .collect();
    assert_eq!(fs, expected);
    assert!(species_list("").unwrap().is_empty());
}

#[test]
fn sides() {
    let rxn = rules::reaction("A + i + i <=> 2 i").unwrap();
    assert_eq!(rxn.reactants, ms!(A, i * 2));
    assert_eq!(rxn.products, ms!(i * 2));
    assert!(rxn.reversible);
}

#[test]
fn locate() {
    let input = "A -> i\ni -> B\n# end";
    macro_rules! run {
        { $pos:expr => @($row:expr, $col:expr) $line:expr $(,)? } => {{
            let span = Span::new($pos, $pos);
            let (row, col, line) = span.locate(input);
            println!("{} => ({}, {}) {:?}", $pos, row, col, line);
            assert_eq!(row, $row);
            assert_eq!(col, $col);
            assert_eq!(line, $line);
        }}
    }

    run!(0 => @(0, 0) "A -> i");
    run!(5 => @(0, 5) "A -> i");
    run!(6 => @(0, 6) "A -> i");
    run!(7 => @(1, 0) "i -> B");
    run!(12 => @(1, 5) "i -> B");
    run!(14 => @(2, 0) "# end");
    run!(19 => @(2, 5) "# end");
    // Past the end.
    run!(30 => @(2, 5) "# end");
}
