//! Multi-document YAML streams.
//!
//! Documents are separated by the literal `---\n` sequence. Splitting is not
//! YAML aware: a separator inside a block scalar splits the document too.

/// Separator placed between documents of a manifest file.
pub const SEPARATOR: &[u8] = b"---\n";

/// Split a YAML stream into its documents.
///
/// Always yields at least one element; an input without separators
/// (including an empty one) comes back whole.
pub fn split(contents: &[u8]) -> Vec<&[u8]> {
	let mut documents = Vec::new();
	let mut rest = contents;

	while let Some(pos) = find(rest, SEPARATOR) {
		documents.push(&rest[..pos]);
		rest = &rest[pos + SEPARATOR.len()..];
	}
	documents.push(rest);

	documents
}

/// Join documents back into a single stream.
pub fn join<D: AsRef<[u8]>>(documents: &[D]) -> Vec<u8> {
	let mut out = Vec::new();
	for (idx, document) in documents.iter().enumerate() {
		if idx > 0 {
			out.extend_from_slice(SEPARATOR);
		}
		out.extend_from_slice(document.as_ref());
	}
	out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

/// Documents of a manifest file that were not the target of a read.
///
/// Kept as raw bytes so they are written back exactly as they were found,
/// together with the index the target document occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leftovers {
	documents: Vec<Vec<u8>>,
	position: usize,
}

impl Leftovers {
	/// Take the document at `position` out of `documents`, keeping the rest.
	pub(crate) fn without(documents: &[&[u8]], position: usize) -> Self {
		let documents = documents
			.iter()
			.enumerate()
			.filter(|(idx, _)| *idx != position)
			.map(|(_, document)| document.to_vec())
			.collect();
		Self {
			documents,
			position,
		}
	}

	/// Keep every document; the target is appended after the last one.
	///
	/// Empty trailing documents are dropped and a final newline is added when
	/// missing so the appended target starts on its own line.
	pub fn appending(documents: &[&[u8]]) -> Self {
		let mut documents: Vec<Vec<u8>> = documents.iter().map(|d| d.to_vec()).collect();
		while documents.last().is_some_and(|d| d.trim_ascii().is_empty()) {
			documents.pop();
		}
		if let Some(last) = documents.last_mut() {
			if !last.ends_with(b"\n") {
				last.push(b'\n');
			}
		}
		let position = documents.len();
		Self {
			documents,
			position,
		}
	}

	/// Leftover documents in their original relative order.
	pub fn documents(&self) -> &[Vec<u8>] {
		&self.documents
	}

	/// Index the target document is put back at.
	pub fn position(&self) -> usize {
		self.position
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	/// Re-insert `target` among the leftovers and join everything into one stream.
	pub fn assemble(&self, target: &[u8]) -> Vec<u8> {
		let position = self.position.min(self.documents.len());
		let mut documents: Vec<&[u8]> = self.documents.iter().map(Vec::as_slice).collect();
		documents.insert(position, target);
		join(&documents)
	}
}
