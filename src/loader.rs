//! Load a dataset split over files into the canonical partition
//!
//! The number of elements in each file is only known once the file has been opened, so
//! loading happens in two passes. The first pass visits every file and records its element
//! count. Once all counts are known the loader plans the chunks this rank reads. The second
//! pass visits every chunk and tells the caller where to read from and where to store.
//!
//! ```no_run
//! # use mpi::traits::Communicator;
//! # use redistribute::loader::FileLoader;
//! # fn read_count(file: usize) -> usize { 0 }
//! # fn read_value(file: usize, offset: usize) -> u64 { 0 }
//! let universe = mpi::initialize().unwrap();
//! let world = universe.world();
//! let mut fl = FileLoader::new(&world, 4);
//! while !fl.init_done() {
//!     let n = read_count(fl.init_file_index());
//!     fl.set_file_elems(n);
//!     fl.init_next();
//! }
//! let mut data = vec![0u64; fl.n_local_elems()];
//! fl.load_begin();
//! while !fl.load_done() {
//!     for k in 0..fl.chunk_size() {
//!         data[fl.data_offset(k)] = read_value(fl.chunk_file_index(), fl.chunk_offset() + k);
//!     }
//!     fl.load_next();
//! }
//! ```
use crate::{
    chunks::plan_chunks,
    collective::exclusive_offset,
    error::Result,
    partition::local_size,
    traits::ChunkSource,
    types::Chunk,
};
use log::debug;
use mpi::traits::Communicator;

/// Stage of a [`FileLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Waiting for the element count of `file`
    CollectingSizes {
        /// The current file
        file: usize,
    },
    /// All counts are known and the chunks are planned
    Planned,
    /// Visiting the chunks
    Loading {
        /// The current chunk
        chunk: usize,
        /// Number of elements stored by the previous chunks
        data_offset: usize,
    },
    /// All chunks visited
    Done,
}

/// Two pass file loader
pub struct FileLoader<'a, C: Communicator> {
    comm: &'a C,
    file_elems: Vec<usize>,
    chunks: Vec<Chunk>,
    n_local_elems: usize,
    elem_offset: usize,
    state: LoaderState,
}

impl<'a, C: Communicator> FileLoader<'a, C> {
    /// Create new, ready to collect the sizes of `n_files` files
    pub fn new(comm: &'a C, n_files: usize) -> Self {
        Self {
            comm,
            file_elems: vec![0; n_files],
            chunks: vec![],
            n_local_elems: 0,
            elem_offset: 0,
            state: LoaderState::CollectingSizes { file: 0 },
        }
    }

    /// The current stage
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Number of files
    pub fn n_files(&self) -> usize {
        self.file_elems.len()
    }

    // The current file of the first pass.
    fn current_file(&self) -> usize {
        match self.state {
            LoaderState::CollectingSizes { file } => file,
            _ => panic!("File sizes have already been collected."),
        }
    }

    /// Test whether the first pass has visited all files
    ///
    /// When it has, the chunks are planned. This is collective the first time it returns
    /// true.
    pub fn init_done(&mut self) -> bool {
        match self.state {
            LoaderState::CollectingSizes { file } if file == self.n_files() => {
                self.plan();
                true
            }
            LoaderState::CollectingSizes { .. } => false,
            _ => true,
        }
    }

    /// Index of the file whose size is expected
    pub fn init_file_index(&self) -> usize {
        self.current_file()
    }

    /// Record the number of elements in the current file
    pub fn set_file_elems(&mut self, n_elems: usize) {
        let file = self.current_file();
        assert!(file < self.n_files(), "All file sizes have been set.");
        self.file_elems[file] = n_elems;
    }

    /// Move to the next file
    pub fn init_next(&mut self) {
        let file = self.current_file();
        assert!(file < self.n_files(), "All file sizes have been set.");
        self.state = LoaderState::CollectingSizes { file: file + 1 };
    }

    /// Collect the size of every file with `f`
    pub fn collect_sizes(&mut self, mut f: impl FnMut(usize) -> usize) {
        while !self.init_done() {
            self.set_file_elems(f(self.init_file_index()));
            self.init_next();
        }
    }

    /// Collect the size of every file with a fallible `f`
    ///
    /// On error the remaining files are not visited and the chunks are not planned. Other
    /// ranks may then be waiting in the collective planning step.
    pub fn try_collect_sizes<E>(
        &mut self,
        mut f: impl FnMut(usize) -> std::result::Result<usize, E>,
    ) -> std::result::Result<(), E> {
        while !self.init_done() {
            self.set_file_elems(f(self.init_file_index())?);
            self.init_next();
        }
        Ok(())
    }

    fn plan(&mut self) {
        let rank = self.comm.rank() as usize;
        let size = self.comm.size() as usize;
        let n_elems = self.n_elems();

        // This rank's range follows from a scan over the local sizes.
        self.n_local_elems = local_size(n_elems, size, rank);
        self.elem_offset = exclusive_offset(self.comm, self.n_local_elems);
        self.chunks = plan_chunks(
            &self.file_elems,
            self.elem_offset..self.elem_offset + self.n_local_elems,
        );
        self.state = LoaderState::Planned;

        debug!(
            "Rank {rank}: loading elements {}..{} of {n_elems} in {} chunks.",
            self.elem_offset,
            self.elem_offset + self.n_local_elems,
            self.chunks.len()
        );
    }

    fn assert_planned(&self) {
        assert!(
            !matches!(self.state, LoaderState::CollectingSizes { .. }),
            "File sizes have not been collected yet."
        );
    }

    /// Global number of elements over all files
    pub fn n_elems(&self) -> usize {
        self.file_elems.iter().sum()
    }

    /// Number of elements in each file
    pub fn file_elems(&self) -> &[usize] {
        &self.file_elems
    }

    /// Number of elements this rank loads
    pub fn n_local_elems(&self) -> usize {
        self.assert_planned();
        self.n_local_elems
    }

    /// Global index of the first element this rank loads
    pub fn elem_offset(&self) -> usize {
        self.assert_planned();
        self.elem_offset
    }

    /// The chunks this rank loads
    pub fn chunks(&self) -> &[Chunk] {
        self.assert_planned();
        &self.chunks
    }

    /// Start the second pass
    pub fn load_begin(&mut self) {
        self.assert_planned();
        self.state = if self.chunks.is_empty() {
            LoaderState::Done
        } else {
            LoaderState::Loading {
                chunk: 0,
                data_offset: 0,
            }
        };
    }

    /// Test whether the second pass has visited all chunks
    pub fn load_done(&self) -> bool {
        match self.state {
            LoaderState::Loading { .. } => false,
            LoaderState::Done => true,
            _ => panic!("Loading has not begun."),
        }
    }

    /// Move to the next chunk
    pub fn load_next(&mut self) {
        let (chunk, data_offset) = self.cursor();
        let next = chunk + 1;
        self.state = if next == self.chunks.len() {
            LoaderState::Done
        } else {
            LoaderState::Loading {
                chunk: next,
                data_offset: data_offset + self.chunks[chunk].len,
            }
        };
    }

    fn cursor(&self) -> (usize, usize) {
        match self.state {
            LoaderState::Loading { chunk, data_offset } => (chunk, data_offset),
            _ => panic!("No current chunk."),
        }
    }

    /// The current chunk
    pub fn chunk(&self) -> &Chunk {
        &self.chunks[self.cursor().0]
    }

    /// File of the current chunk
    pub fn chunk_file_index(&self) -> usize {
        self.chunk().file
    }

    /// Offset of the current chunk inside its file
    pub fn chunk_offset(&self) -> usize {
        self.chunk().offset
    }

    /// Number of elements in the current chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk().len
    }

    /// Local position of element `chunk_offset` of the current chunk
    pub fn data_offset(&self, chunk_offset: usize) -> usize {
        let (_, data_offset) = self.cursor();
        assert!(
            data_offset + chunk_offset < self.n_local_elems,
            "Offset {chunk_offset} is past the end of the local data."
        );
        data_offset + chunk_offset
    }

    /// Visit every chunk with `f`, passing the part of `buf` the chunk fills
    ///
    /// `buf` holds `width` values per local element.
    pub fn load_into<T>(
        &mut self,
        buf: &mut [T],
        width: usize,
        mut f: impl FnMut(&Chunk, &mut [T]),
    ) {
        self.try_load_into(buf, width, |chunk, dest| {
            f(chunk, dest);
            Ok::<(), std::convert::Infallible>(())
        })
        .unwrap_or_else(|e| match e {});
    }

    /// Visit every chunk with a fallible `f`, passing the part of `buf` the chunk fills
    pub fn try_load_into<T, E>(
        &mut self,
        buf: &mut [T],
        width: usize,
        mut f: impl FnMut(&Chunk, &mut [T]) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        assert_eq!(
            buf.len(),
            self.n_local_elems() * width,
            "Buffer does not match the local element count."
        );
        self.load_begin();
        while !self.load_done() {
            let chunk = *self.chunk();
            let start = self.data_offset(0) * width;
            f(&chunk, &mut buf[start..start + chunk.len * width])?;
            self.load_next();
        }
        Ok(())
    }

    /// Load this rank's part of the elements of `source`
    ///
    /// The returned buffer holds `source.width()` values per element. Collective.
    pub fn load_from<S: ChunkSource>(comm: &'a C, source: &mut S) -> Result<Vec<S::Item>>
    where
        S::Item: Default + Clone,
    {
        let mut fl = Self::new(comm, source.n_files());
        fl.try_collect_sizes(|file| source.element_count(file))?;
        let width = source.width();
        let mut buf = vec![S::Item::default(); fl.n_local_elems() * width];
        fl.try_load_into(&mut buf, width, |chunk, dest| source.read_chunk(chunk, dest))?;
        Ok(buf)
    }
}
