use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use htmlcheck::validation::balance::verify_tag_balance;
use htmlcheck::{validate, RuleTables, ValidationReport};

/// Generate a document body with a specific validation scenario
fn generate_document(sections: usize, scenario: &str) -> String {
    let mut body = String::new();

    for i in 0..sections {
        match scenario {
            "all_valid" => body.push_str(&format!(
                "<section id=\"s{i}\"><h2>Section {i}</h2><p>Text <a href=\"#s{i}\">link</a><br>more</p>\n<ul><li>one</li><li>two</li></ul>\n<img src=\"{i}.png\" alt=\"\"></section>\n"
            )),
            "unbalanced" => body.push_str(&format!(
                "<div><p>Paragraph {i}</div>\n<span><b><i>x</b></i></span>\n</em>\n"
            )),
            "rule_violations" => body.push_str(&format!(
                "<div id=\"dup\"><li>stray</li><img><p><div>nested</div></p><center>old</center>\n<button onclick=\"go({i})\" class=\"\">go</button></div>\n"
            )),
            "embedded_regions" => body.push_str(&format!(
                "<script>if (a < b) {{ document.write('</div>'); }}</script>\n<!-- <p> {i} -->\n<style>p > a {{ color: red }}</style><p>{i}</p>\n"
            )),
            _ => {}
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Bench</title></head>\n<body>\n{}</body>\n</html>\n",
        body
    )
}

/// Benchmark full validation across error densities
fn bench_validation_scenarios(c: &mut Criterion) {
    let scenarios = ["all_valid", "unbalanced", "rule_violations", "embedded_regions"];

    let mut group = c.benchmark_group("validation_scenarios");

    for scenario in scenarios {
        let markup = generate_document(200, scenario);
        group.throughput(Throughput::Bytes(markup.len() as u64));
        group.bench_with_input(BenchmarkId::new("scenario", scenario), &markup, |b, markup| {
            b.iter(|| black_box(validate(black_box(markup))))
        });
    }

    group.finish();
}

/// Benchmark how validation scales with document size
fn bench_validation_scalability(c: &mut Criterion) {
    let sizes = [10, 100, 1_000];

    let mut group = c.benchmark_group("validation_scalability");

    for size in sizes {
        let markup = generate_document(size, "all_valid");
        group.throughput(Throughput::Bytes(markup.len() as u64));
        group.bench_with_input(BenchmarkId::new("sections", size), &markup, |b, markup| {
            b.iter(|| black_box(validate(black_box(markup))))
        });
    }

    group.finish();
}

/// Benchmark the raw-text tag balance pass on its own
fn bench_tag_balance(c: &mut Criterion) {
    let rules = RuleTables::builtin();
    let mut group = c.benchmark_group("tag_balance");

    for scenario in ["all_valid", "unbalanced", "embedded_regions"] {
        let markup = generate_document(1_000, scenario);
        group.throughput(Throughput::Bytes(markup.len() as u64));
        group.bench_with_input(BenchmarkId::new("scenario", scenario), &markup, |b, markup| {
            b.iter(|| {
                let mut report = ValidationReport::new();
                verify_tag_balance(black_box(markup), rules, &mut report);
                black_box(report)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_validation_scenarios,
    bench_validation_scalability,
    bench_tag_balance
);
criterion_main!(benches);
