use std::fs;

use clap::Parser;
use sift_config::Config;
use sift_core::NonTextPolicy;

use crate::io::Format;
use crate::{Args, run};

fn args(input: &std::path::Path, output: &std::path::Path, extra: &[&str]) -> Args {
    let mut argv = vec![
        "sift".to_string(),
        "--input".to_string(),
        input.display().to_string(),
        "--output".to_string(),
        output.display().to_string(),
    ];
    argv.extend(extra.iter().map(|a| a.to_string()));
    Args::parse_from(argv)
}

#[test]
fn csv_dataset_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let output = dir.path().join("clean.csv");
    fs::write(
        &input,
        "title,text,subject,date,label,id\n\
         \"Breaking: Stocks Fall 10%!\",The market dropped sharply today., Business ,2021-01-05,fake,7\n\
         Markets rallied,,politics,not-a-date,unknown,8\n",
    )
    .unwrap();

    let args = args(&input, &output, &["--workers", "2"]);
    let mut config = Config::default();
    args.apply_to(&mut config);

    let summary = run(&args, &config).unwrap();

    assert_eq!(summary.unparsable_dates, 1);
    assert_eq!(summary.unrecognized_labels, 1);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "title,text,subject,date,label,id,year,month,day\n\
         breaking stock fall,market dropped sharply today,business,2021-01-05,0,7,2021,1,5\n\
         market rallied,,politics,,,8,,,\n"
    );
}

#[test]
fn jsonl_dataset_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.jsonl");
    let output = dir.path().join("clean.jsonl");
    fs::write(
        &input,
        "{\"title\": \"Markets rallied\", \"date\": \"2020-03-15\", \"label\": \"real\"}\n",
    )
    .unwrap();

    let summary = run(&args(&input, &output, &[]), &Config::default()).unwrap();

    assert_eq!(summary.total(), 0);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"title\":\"market rallied\",\"date\":\"2020-03-15\",\"label\":1,\"year\":2020,\"month\":3,\"day\":15}\n"
    );
}

#[test]
fn output_format_follows_output_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let output = dir.path().join("clean.jsonl");
    fs::write(&input, "subject\n Tech \n").unwrap();

    run(&args(&input, &output, &[]), &Config::default()).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"subject\":\"tech\",\"year\":null,\"month\":null,\"day\":null}\n"
    );
}

#[test]
fn missing_resources_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let output = dir.path().join("clean.csv");
    fs::write(&input, "title\nMarkets\n").unwrap();

    let resource_dir = dir.path().join("resources");
    fs::create_dir(&resource_dir).unwrap();
    let resource_dir = resource_dir.display().to_string();
    let args = args(&input, &output, &["--resource-dir", &resource_dir]);

    let mut config = Config::default();
    args.apply_to(&mut config);
    let err = run(&args, &config).unwrap_err();

    assert!(format!("{err:#}").contains("stopwords.txt"));
    assert!(!output.exists());
}

#[test]
fn unsupported_language_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let output = dir.path().join("clean.csv");
    fs::write(&input, "title\nMarkets\n").unwrap();

    let mut config = Config::default();
    config.resources.language = "fr".to_string();

    let err = run(&args(&input, &output, &[]), &config).unwrap_err();
    assert!(format!("{err:#}").contains("'fr'"));
}

#[test]
fn flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let args = args(
        &dir.path().join("in.txt"),
        &dir.path().join("out.txt"),
        &["--workers", "3", "--language", "en-US", "--non-text", "stringify", "--format", "jsonl"],
    );

    let mut config = Config::default();
    args.apply_to(&mut config);

    assert_eq!(config.pipeline.workers, 3);
    assert_eq!(config.resources.language, "en-US");
    assert_eq!(config.pipeline.non_text, NonTextPolicy::Stringify);
    assert_eq!(config.pipeline.chunk_size, 256);
    assert_eq!(args.input_format(), Format::Jsonl);
    assert_eq!(args.output_format(), Format::Jsonl);
}

#[test]
fn invalid_non_text_flag_is_rejected() {
    let result = Args::try_parse_from([
        "sift", "--input", "a.csv", "--output", "b.csv", "--non-text", "drop",
    ]);
    assert!(result.is_err());
}
