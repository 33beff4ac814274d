use std::borrow::Cow;

use html5ever::tendril::{fmt::UTF8, StrTendril, TendrilSink};
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use super::{remove_excess_whitespace, VenueOffers};

const VENUE_CLASS: &str = "dinerInfo";
const OFFER_CLASS: &str = "offer";

/// Where the scanner is in the page. Only start tags move it forward; a
/// captured venue name is the one transition back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    VenueName,
    LunchOffer,
    /// Entered on `<strong>` inside an offer block. Nothing is captured
    /// here, so the price and any text after it stay out of the offers until
    /// the next classified `div`.
    Price,
}

/// What a finished scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub offers: VenueOffers,
    /// Offer texts that showed up before any venue name and were dropped.
    pub orphan_offers: usize,
}

#[derive(Debug, Default)]
struct OfferSink {
    state: State,
    current_venue: Option<String>,
    text: String,
    /// Inside `<script>` or `<style>`, whose bodies are never page text.
    raw_text: bool,
    scan: Scan,
}

fn class_of(tag: &Tag) -> Option<&str> {
    tag.attrs
        .iter()
        .find(|attr| &*attr.name.local == "class")
        .map(|attr| &*attr.value)
}

fn raw_kind(tag: &Tag) -> Option<RawKind> {
    match &*tag.name {
        "script" => Some(RawKind::ScriptData),
        "style" => Some(RawKind::Rawtext),
        _ => None,
    }
}

impl OfferSink {
    fn start_tag(&mut self, tag: &Tag) {
        if &*tag.name == "div" {
            match class_of(tag) {
                Some(VENUE_CLASS) => self.state = State::VenueName,
                Some(OFFER_CLASS) => self.state = State::LunchOffer,
                _ => {}
            }
        }
        if self.state == State::LunchOffer && &*tag.name == "strong" {
            self.state = State::Price;
        }
    }

    /// Hands the buffered text node to the state machine.
    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text);
        let Some(text) = remove_excess_whitespace(&raw) else {
            return;
        };
        match self.state {
            State::Idle => {}
            State::VenueName => {
                log::debug!("Found venue name: {text}");
                self.scan.offers.register(&text);
                self.current_venue = Some(text);
                self.state = State::Idle;
            }
            State::Price => log::trace!("Skipping text in price: {text}"),
            State::LunchOffer => match &self.current_venue {
                Some(venue) => {
                    log::trace!("Found lunch offer for {venue}: {text}");
                    self.scan.offers.push_offer(venue, text);
                }
                None => {
                    log::warn!("Dropping lunch offer found before any venue: {text}");
                    self.scan.orphan_offers += 1;
                }
            },
        }
    }
}

impl TokenSink for OfferSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            // the tokenizer may split one text node into several tokens
            Token::CharacterTokens(text) => {
                if self.state != State::Idle && !self.raw_text {
                    self.text.push_str(&text);
                }
            }
            Token::TagToken(tag) => {
                self.flush_text();
                self.raw_text = false;
                if tag.kind == TagKind::StartTag {
                    self.start_tag(&tag);
                    if !tag.self_closing {
                        if let Some(kind) = raw_kind(&tag) {
                            self.raw_text = true;
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                }
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => {
                self.flush_text();
            }
            Token::NullCharacterToken | Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }
}

/// Incremental extractor for the offers page.
///
/// Chunks may cut through tags, entities or text nodes; everything not yet
/// consumed stays queued until the next [`feed`](Self::feed) or
/// [`finish`](Self::finish). Malformed markup never fails the scan, it only
/// yields fewer venues or offers.
///
/// Also a [`TendrilSink`], so bytes can be pushed through a
/// [`Utf8LossyDecoder`](html5ever::tendril::stream::Utf8LossyDecoder).
pub struct OfferScanner {
    tokenizer: Tokenizer<OfferSink>,
    input: BufferQueue,
}

impl Default for OfferScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OfferScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfferScanner")
            .field("state", &self.tokenizer.sink.state)
            .field("current_venue", &self.tokenizer.sink.current_venue)
            .finish_non_exhaustive()
    }
}

impl OfferScanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(OfferSink::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
        }
    }

    pub fn feed(&mut self, chunk: impl Into<StrTendril>) {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return;
        }
        self.input.push_back(chunk);
        let _ = self.tokenizer.feed(&mut self.input);
    }

    #[cfg(test)]
    #[must_use]
    pub const fn state(&self) -> State {
        self.tokenizer.sink.state
    }

    #[must_use]
    pub fn finish(mut self) -> Scan {
        let _ = self.tokenizer.feed(&mut self.input);
        self.tokenizer.end();
        let sink = self.tokenizer.sink;
        if sink.scan.orphan_offers > 0 {
            log::warn!(
                "{} offer(s) appeared outside of any venue",
                sink.scan.orphan_offers
            );
        }
        sink.scan
    }

    /// Scans a complete document in one go.
    #[cfg(test)]
    #[must_use]
    pub fn scan(html: &str) -> Scan {
        let mut scanner = Self::new();
        scanner.feed(html);
        scanner.finish()
    }
}

impl TendrilSink<UTF8> for OfferScanner {
    type Output = Scan;

    fn process(&mut self, t: StrTendril) {
        self.feed(t);
    }

    fn error(&mut self, desc: Cow<'static, str>) {
        log::debug!("Offers page is not valid UTF-8: {desc}");
    }

    fn finish(self) -> Scan {
        Self::finish(self)
    }
}
