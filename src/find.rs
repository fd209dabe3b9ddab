use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::file_sequence::FileSequence;
use crate::padding::Padding;

struct Group {
    padding: Padding,
    members: Vec<FileSequence>,
}

/// Reconstruct file sequences from an unordered list of filenames.
///
/// Returns the recognized sequences and the leftover names. Filenames
/// group by `(prefix, suffix)`; names whose padding cannot combine with
/// an existing group split off into a parallel group, so `foo.01.jpg`
/// and `foo.001.jpg` come back as two sequences. Sequences are emitted
/// in group-key order, non-sequences in input order.
pub fn find_sequence<I, S>(files: I) -> Result<(Vec<FileSequence>, Vec<String>)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<(String, String, u32), Group> = BTreeMap::new();
    let mut nonsequences = Vec::new();

    for file in files {
        let name = file.as_ref();
        let candidate = match FileSequence::parse(name) {
            Ok(candidate) => candidate,
            Err(_) => {
                nonsequences.push(name.to_string());
                continue;
            }
        };
        // A name that itself encodes anything but exactly one frame is
        // not a single file on disk.
        if candidate.size() != 1 {
            nonsequences.push(name.to_string());
            continue;
        }

        let prefix = candidate.prefix().to_string();
        let suffix = candidate.suffix().to_string();
        let padding = candidate.padding();

        let mut collision = 0u32;
        let slot = loop {
            match groups.get(&(prefix.clone(), suffix.clone(), collision)) {
                Some(group) if !group.padding.combine(padding).is_valid() => collision += 1,
                _ => break collision,
            }
        };
        let group = groups.entry((prefix, suffix, slot)).or_insert_with(|| Group {
            padding,
            members: Vec::new(),
        });
        group.padding = group.padding.combine(padding);
        group.members.push(candidate);
    }

    let mut sequences = Vec::with_capacity(groups.len());
    for (_, group) in groups {
        let mut members = group.members.into_iter();
        let Some(mut head) = members.next() else {
            continue;
        };
        let rest: Vec<FileSequence> = members.collect();
        head.merge_multiple(&rest)?;
        sequences.push(head);
    }
    Ok((sequences, nonsequences))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Walk a directory tree and reconstruct the sequences in it.
///
/// Filenames are reported relative to `root`. Discovery runs per
/// directory over that directory's sorted file list; batching this way
/// keeps the group count per [`find_sequence`] call small, which matters
/// on wide trees.
pub fn find_sequence_on_disk(
    root: &Path,
    include_hidden: bool,
) -> Result<(Vec<FileSequence>, Vec<String>)> {
    let mut by_dir: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| include_hidden || entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let dir = rel
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        by_dir
            .entry(dir)
            .or_default()
            .push(rel.to_string_lossy().into_owned());
    }

    let mut sequences = Vec::new();
    let mut nonsequences = Vec::new();
    for (dir, mut names) in by_dir {
        names.sort();
        debug!("collapsing {} files under {:?}", names.len(), dir);
        let (mut seqs, mut nonseqs) = find_sequence(names)?;
        sequences.append(&mut seqs);
        nonsequences.append(&mut nonseqs);
    }
    Ok((sequences, nonsequences))
}
