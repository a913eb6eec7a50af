use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::{Parser, Subcommand};
use hmmtag::{
    hmm::config::DEFAULT_UNSEEN_PENALTY, tokenize, Dataset, Evaluation, HmmConfig, HmmModel, Result,
    Tagger,
};

/// Part-of-speech tagging with a bigram HMM and Viterbi decoding
#[derive(Debug, Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Argv {
    /// raise the log level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate a model from a sentence file and a parallel tag file
    Train {
        /// one sentence per line, whitespace separated
        #[arg(short, long, value_name = "FILE")]
        sentences: PathBuf,
        /// one tag sequence per line, aligned with SENTENCES
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,
        /// write the model to a file (MODEL)
        #[arg(short, long, value_name = "MODEL")]
        model: PathBuf,
        /// score added for a word never seen with a tag
        #[arg(long, default_value_t = DEFAULT_UNSEEN_PENALTY, allow_negative_numbers = true)]
        penalty: f64,
        /// tags that end a sentence (repeatable)
        #[arg(long = "terminal", value_name = "TAG", default_values_t = [".".to_string()])]
        terminal_tags: Vec<String>,
    },
    /// Tag each line of the given files, or read sentences from stdin
    Tag {
        /// read a model from a file (MODEL)
        #[arg(short, long, value_name = "MODEL")]
        model: PathBuf,
        #[arg(value_name = "FILE")]
        inputs: Vec<PathBuf>,
    },
    /// Report the accuracy of a model on a tagged corpus
    Test {
        #[arg(short, long, value_name = "MODEL")]
        model: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        sentences: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,
        /// suppress per-sentence output
        #[arg(short, long)]
        quiet: bool,
    },
}

fn train(sentences: PathBuf, tags: PathBuf, model: PathBuf, config: HmmConfig) -> Result<()> {
    let begin = Instant::now();
    let ds = Dataset::from_files(&sentences, &tags)?;
    let hmm = HmmModel::train(&ds, config)?;
    hmm.save(&model)?;
    log::info!("write model to {} (took {:?})", model.display(), begin.elapsed());
    Ok(())
}

fn tag_lines<R: BufRead, W: Write>(
    tagger: &Tagger,
    input: R,
    out: &mut W,
    prompt: bool,
) -> Result<()> {
    if prompt {
        writeln!(out, "Please type your sentence:")?;
        out.flush()?;
    }
    for line in input.lines() {
        let tokens = tokenize(&line?);
        if !tokens.is_empty() {
            match tagger.tag(&tokens) {
                Ok(tags) => {
                    for (word, tag) in tokens.iter().zip(&tags) {
                        writeln!(out, "{word} = {tag}")?;
                    }
                    writeln!(out)?;
                }
                Err(e) if e.is_decode_failure() => {
                    log::warn!("failed to tag {:?}: {e}", tokens.join(" "))
                }
                Err(e) => return Err(e),
            }
        }
        if prompt {
            writeln!(out, "Please type your sentence:")?;
        }
        out.flush()?;
    }
    Ok(())
}

fn tag(model: PathBuf, inputs: Vec<PathBuf>) -> Result<()> {
    let hmm = HmmModel::from_path(&model)?;
    let tagger = hmm.tagger();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if inputs.is_empty() {
        return tag_lines(&tagger, io::stdin().lock(), &mut out, true);
    }
    for fpath in inputs {
        tag_lines(&tagger, BufReader::new(File::open(fpath)?), &mut out, false)?;
    }
    Ok(())
}

/// Tags every sentence of `ds` and scores it against the gold tags. Unless `quiet`,
/// writes `word<TAB>gold<TAB>predicted` lines per sentence.
fn evaluate<W: Write>(
    tagger: &Tagger,
    ds: &Dataset,
    out: &mut W,
    quiet: bool,
) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    for seq in &ds.seqs {
        match tagger.tag(seq.tokens()) {
            Ok(prediction) => {
                if !quiet {
                    let pairs = seq.tokens().iter().zip(seq.tags());
                    for ((word, gold), pred) in pairs.zip(&prediction) {
                        writeln!(out, "{word}\t{gold}\t{pred}")?;
                    }
                    writeln!(out)?;
                }
                evaluation.accumulate(seq.tags(), &prediction);
            }
            Err(e) if e.is_decode_failure() => {
                log::warn!("failed to tag {:?}: {e}", seq.tokens().join(" "));
                evaluation.skip(seq.tags());
            }
            Err(e) => return Err(e),
        }
    }
    evaluation.evaluate();
    Ok(evaluation)
}

fn test(model: PathBuf, sentences: PathBuf, tags: PathBuf, quiet: bool) -> Result<()> {
    let hmm = HmmModel::from_path(&model)?;
    let ds = Dataset::from_files(&sentences, &tags)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let begin = Instant::now();
    let evaluation = evaluate(&hmm.tagger(), &ds, &mut out, quiet)?;
    let elapsed = begin.elapsed();
    writeln!(out, "{}", evaluation)?;
    writeln!(
        out,
        "Elapsed time: {:.6} [sec] ({:.1} [instance/sec])",
        elapsed.as_secs_f64(),
        ds.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("{:?}", argv);

    let ret = match argv.command {
        Command::Train { sentences, tags, model, penalty, terminal_tags } => {
            let config = HmmConfig::new()
                .with_unseen_penalty(penalty)
                .with_terminal_tags(terminal_tags);
            train(sentences, tags, model, config)
        }
        Command::Tag { model, inputs } => tag(model, inputs),
        Command::Test { model, sentences, tags, quiet } => test(model, sentences, tags, quiet),
    };
    match ret {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
