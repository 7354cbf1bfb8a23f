use std::collections::VecDeque;

/// The inverse of a user action, applied on undo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	/// Show the layer again and put back the focus its hiding cleared.
	Show {
		category: String,
		focus: Option<usize>,
	},
	Hide(String),
	/// Put the selection back to this node (or clear it).
	Select(Option<usize>),
}

/// Bounded undo stack. The oldest entry is dropped once the limit is hit.
#[derive(Clone, Debug)]
pub struct History {
	entries: VecDeque<Command>,
	limit: usize,
}

impl History {
	pub fn new(limit: usize) -> Self {
		Self {
			entries: VecDeque::new(),
			limit,
		}
	}

	pub fn push(&mut self, inverse: Command) {
		if self.limit == 0 {
			return;
		}
		if self.entries.len() == self.limit {
			self.entries.pop_front();
		}
		self.entries.push_back(inverse);
	}

	pub fn pop(&mut self) -> Option<Command> {
		self.entries.pop_back()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries, most recent last.
	pub fn iter(&self) -> impl Iterator<Item = &Command> {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drops_oldest_past_limit() {
		let mut history = History::new(2);
		history.push(Command::Hide("GO".into()));
		history.push(Command::Select(None));
		history.push(Command::Show {
			category: "GO".into(),
			focus: None,
		});
		assert_eq!(history.len(), 2);
		assert_eq!(
			history.pop(),
			Some(Command::Show {
				category: "GO".into(),
				focus: None,
			})
		);
		assert_eq!(history.pop(), Some(Command::Select(None)));
		assert!(history.pop().is_none());
	}

	#[test]
	fn zero_limit_records_nothing() {
		let mut history = History::new(0);
		history.push(Command::Select(Some(1)));
		assert!(history.is_empty());
	}
}
