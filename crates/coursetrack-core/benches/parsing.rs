use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coursetrack_core::parser::parse_roster_str;

/// Generate a roster TOML string with `accounts` accounts, each assigned to
/// one of `courses` courses.
fn generate_roster_toml(courses: usize, accounts: usize) -> String {
    let mut s = String::from(
        "[roster]\nid = \"bench\"\nname = \"Bench Roster\"\n",
    );

    for c in 0..courses {
        s.push_str(&format!(
            "\n[[courses]]\nid = \"course-{c}\"\ntitle = \"Course {c}\"\n"
        ));
        for v in 0..4 {
            s.push_str(&format!(
                "\n[[courses.videos]]\nid = \"v{c}-{v}\"\ntitle = \"Video {v}\"\n"
            ));
        }
        s.push_str(&format!(
            "\n[[courses.quizzes]]\nid = \"q{c}\"\ntitle = \"Quiz {c}\"\n"
        ));
        for _ in 0..5 {
            s.push_str(
                "\n[[courses.quizzes.questions]]\nprompt = \"?\"\nchoices = [\"a\", \"b\"]\ncorrect_choice = 0\n",
            );
        }
    }

    for a in 0..accounts {
        s.push_str(&format!(
            "\n[[accounts]]\nid = \"acct-{a}\"\nemail = \"acct{a}@example.com\"\nname = \"Account {a}\"\ncreated_at = \"2026-07-01T00:00:00Z\"\n"
        ));
        s.push_str(&format!(
            "\n[[assignments]]\naccount_id = \"acct-{a}\"\ncourse_id = \"course-{}\"\ndue_date = \"2026-10-01T00:00:00Z\"\nassigned_at = \"2026-08-01T00:00:00Z\"\n",
            a % courses
        ));
    }

    s
}

fn bench_roster_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("roster_parsing");

    let small = generate_roster_toml(2, 10);
    let medium = generate_roster_toml(10, 100);
    let large = generate_roster_toml(25, 500);

    group.bench_function("10_accounts", |b| {
        b.iter(|| parse_roster_str(black_box(&small), &PathBuf::from("bench.toml")))
    });
    group.bench_function("100_accounts", |b| {
        b.iter(|| parse_roster_str(black_box(&medium), &PathBuf::from("bench.toml")))
    });
    group.bench_function("500_accounts", |b| {
        b.iter(|| parse_roster_str(black_box(&large), &PathBuf::from("bench.toml")))
    });

    group.finish();
}

criterion_group!(benches, bench_roster_parsing);
criterion_main!(benches);
