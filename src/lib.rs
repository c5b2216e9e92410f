//! # tokenfold
//!
//! Folds a flat, ordered sequence of classified tokens into a shallow, typed tree.
//!
//! File Layout
//!
//!     The crate sits between an external tokenizer and a grammar that registers node kinds.
//!     Everything lives under [fold]:
//!
//!         src/fold
//!           ├── sequence    Arena-backed doubly linked list of token links
//!           ├── node        Node kinds and the absorb/extract construction algorithm
//!           ├── registry    Name-keyed table of node constructors
//!           ├── parser      The classification loop that produces a sequence
//!           ├── assembly    Builds top-level nodes out of a classified sequence
//!           ├── validate    Recursive structural validation
//!           ├── view        Key-sorted serialization of built nodes
//!           ├── source      Comment block extraction from source text
//!           ├── config      Layered settings and grammar files
//!           ├── token       Raw tokens handed over by a tokenizer
//!           ├── error       Crate error type
//!           └── testing     Sequence builders and fluent node assertions
//!
//!     A typical run is tokens -> [Parser](fold::parser::Parser) -> [assemble](fold::assembly::assemble)
//!     -> [validate](fold::validate::validate).

pub mod fold;
