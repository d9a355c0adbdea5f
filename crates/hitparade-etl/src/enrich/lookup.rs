use hitparade_core::provenance::Source;

use crate::error::EnrichResult;

/// One external lookup per (title, artist).
///
/// `Ok(None)` means the source answered but has nothing for the song;
/// `Err` means the lookup itself failed.
pub trait SongLookup {
    type Output;

    fn source(&self) -> Source;

    fn lookup(&self, title: &str, artist: &str) -> EnrichResult<Option<Self::Output>>;
}

impl<L: SongLookup + ?Sized> SongLookup for &L {
    type Output = L::Output;

    fn source(&self) -> Source {
        (**self).source()
    }

    fn lookup(&self, title: &str, artist: &str) -> EnrichResult<Option<Self::Output>> {
        (**self).lookup(title, artist)
    }
}
