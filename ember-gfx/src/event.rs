/// Handle returned by [`Event::subscribe`]; pass it back to
/// [`Event::unsubscribe`] to drop the handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EventToken(u32);

/// Minimal single-threaded broadcast list. Handlers run in subscription
/// order; subscribing or unsubscribing from inside a handler is not
/// supported.
pub struct Event<Args> {
	handlers: Vec<(EventToken, Box<dyn FnMut(&Args)>)>,
	next_token: u32,
}

impl<Args> Event<Args> {
	pub fn new() -> Event<Args> {
		Event {
			handlers: Vec::new(),
			next_token: 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	pub fn subscribe(&mut self, handler: impl FnMut(&Args) + 'static) -> EventToken {
		let token = EventToken(self.next_token);
		self.next_token += 1;
		self.handlers.push((token, Box::new(handler)));
		token
	}

	pub fn unsubscribe(&mut self, token: EventToken) {
		self.handlers.retain(|(t, _)| *t != token);
	}

	pub fn emit(&mut self, args: &Args) {
		for (_, handler) in self.handlers.iter_mut() {
			handler(args);
		}
	}
}

impl<Args> Default for Event<Args> {
	fn default() -> Event<Args> {
		Event::new()
	}
}

impl<Args> std::fmt::Debug for Event<Args> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Event").field("handlers", &self.handlers.len()).finish()
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::rc::Rc;

	#[test]
	fn emit_reaches_subscribers_until_unsubscribed() {
		let hits = Rc::new(Cell::new(0));

		let mut event = Event::<u32>::new();
		let hits_inner = hits.clone();
		let token = event.subscribe(move |value| hits_inner.set(hits_inner.get() + *value));

		event.emit(&1);
		event.emit(&2);
		assert_eq!(hits.get(), 3);

		event.unsubscribe(token);
		event.emit(&4);
		assert_eq!(hits.get(), 3);
	}
}
