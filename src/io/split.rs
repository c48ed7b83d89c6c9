use crate::error::{SahgaError, SahgaResult};
use crate::rng::RandomSource;
use std::collections::BTreeMap;
use std::io::Write;

/// Train/test partition of a points file, ids renumbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsSplit {
    pub header: String,
    pub train: Vec<String>,
    pub test: Vec<String>,
}

impl PointsSplit {
    pub fn write_train<W: Write>(&self, w: &mut W) -> SahgaResult<()> {
        write_points(&self.header, &self.train, w)
    }

    pub fn write_test<W: Write>(&self, w: &mut W) -> SahgaResult<()> {
        write_points(&self.header, &self.test, w)
    }
}

fn write_points<W: Write>(header: &str, lines: &[String], w: &mut W) -> SahgaResult<()> {
    writeln!(w, "{}", header)?;
    for line in lines {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Replaces the id field (everything before the first tab) with `id`.
fn renumber(lines: Vec<&str>) -> Vec<String> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| match line.find('\t') {
            Some(pos) => format!("{}{}", i + 1, &line[pos..]),
            None => format!("{}", i + 1),
        })
        .collect()
}

/// Last tab-separated field of a points line.
fn class_of(line: &str) -> &str {
    line.rsplit('\t').next().unwrap_or("").trim()
}

/// Shuffles the data lines of a points file and sends `ratio_percent` of
/// them to the training set.
///
/// `lines` holds the header first. With `stratify`, each class is split on
/// its own so both sets keep the class proportions.
pub fn split_points(
    lines: &[String],
    ratio_percent: f64,
    stratify: bool,
    rng: &mut RandomSource,
) -> SahgaResult<PointsSplit> {
    if !(0.0..=100.0).contains(&ratio_percent) {
        return Err(SahgaError::Config(format!(
            "split ratio must lie in [0, 100], got {}",
            ratio_percent
        )));
    }
    let (header, data) = lines
        .split_first()
        .ok_or_else(|| SahgaError::MalformedInput("points file is empty".into()))?;

    let train_len = |n: usize| (n as f64 * ratio_percent / 100.0) as usize;
    let mut train: Vec<&str> = Vec::new();
    let mut test: Vec<&str> = Vec::new();

    if stratify {
        let mut classes: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for line in data {
            classes.entry(class_of(line)).or_default().push(line);
        }
        for group in classes.values_mut() {
            rng.shuffle(group);
            let k = train_len(group.len());
            train.extend_from_slice(&group[..k]);
            test.extend_from_slice(&group[k..]);
        }
        rng.shuffle(&mut train);
        rng.shuffle(&mut test);
    } else {
        let mut shuffled: Vec<&str> = data.iter().map(String::as_str).collect();
        rng.shuffle(&mut shuffled);
        let k = train_len(shuffled.len());
        test = shuffled.split_off(k);
        train = shuffled;
    }

    Ok(PointsSplit {
        header: header.clone(),
        train: renumber(train),
        test: renumber(test),
    })
}
