/*! Spelling suggestions for Azerbaijani text.

Proposes ranked replacements for out-of-vocabulary words using a
corpus-derived vocabulary. A query is expanded into Azerbaijani
keyboard/phonetic respellings (`ch` -> `ç`, `e` -> `ə`, ...), each
respelling is matched against the vocabulary with a bounded edit
distance, and the per-respelling matches are merged into one
deterministic ranking.

# Usage examples

```
use std::sync::Arc;
use azspell::speller::{Speller, SpellerConfig, VocabSpeller};
use azspell::vocab::Vocabulary;

let vocabulary = Vocabulary::from_entries(vec![("çay", 10), ("cay", 1)]).unwrap();
let speller = VocabSpeller::new(Arc::new(vocabulary), None);

let suggestions = speller.suggest_with_config("cay", &SpellerConfig::default()).unwrap();
assert!(suggestions.iter().any(|s| s.value() == "çay"));
```

Further examples can be found in `azspell-bin` in the same repository.
*/

#![warn(missing_docs)]
pub mod distance;
pub mod speller;
pub mod tokenizer;
pub mod variants;
pub mod vocab;

pub mod types;
