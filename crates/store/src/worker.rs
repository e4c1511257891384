// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Hosts a [`Session`] on a dedicated thread.
//!
//! Callers talk to the thread over a command channel. Each call carries its
//! own response channel and the sender stays locked until the response
//! arrives, so at most one call is in flight per session.

use std::{
	path::{Path, PathBuf},
	sync::{
		Arc,
		mpsc::{self, Receiver, Sender},
	},
	thread::{self, JoinHandle},
};

use parking_lot::Mutex;
use sheetdb_engine::ExportDelimiter;
use sheetdb_type::{
	Copied, CopySelection, DisplayType, QueryResult, Result, Row, Sort, error, internal_error,
};
use tracing::{debug, instrument, warn};

use crate::{
	config::DatastoreConfig,
	datastore::{AddCsv, Datastore},
	session::Session,
};

const THREAD_NAME: &str = "sheetdb-datastore";

type Job = Box<dyn FnOnce(&mut Session) + Send>;

enum Command {
	Run(Job),
	Shutdown {
		respond_to: Option<Sender<Result<()>>>,
	},
}

fn run(mut session: Session, commands: Receiver<Command>) {
	debug!("datastore worker started");

	while let Ok(command) = commands.recv() {
		match command {
			Command::Run(job) => job(&mut session),
			Command::Shutdown {
				respond_to,
			} => {
				let result = session.close();
				match respond_to {
					Some(respond_to) => {
						let _ = respond_to.send(result);
					}
					None => {
						if let Err(err) = result {
							warn!(error = %err, "failed to close session");
						}
					}
				}
				debug!("datastore worker stopped");
				return;
			}
		}
	}

	if let Err(err) = session.close() {
		warn!(error = %err, "failed to close session");
	}
	debug!("datastore worker stopped, all handles dropped");
}

struct Inner {
	sender: Mutex<Sender<Command>>,
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.get_mut().take() {
			let _ = self.sender.get_mut().send(Command::Shutdown {
				respond_to: None,
			});
			if handle.join().is_err() {
				warn!("datastore worker panicked");
			}
		}
	}
}

/// A cloneable handle to a session running on its own thread. Clones share
/// the session; the thread stops when the last handle is dropped or on
/// [`Datastore::close`].
#[derive(Clone)]
pub struct DatastoreWorker {
	inner: Arc<Inner>,
}

impl DatastoreWorker {
	/// Opens a session per `config` and moves it onto a worker thread.
	pub fn spawn(config: DatastoreConfig) -> Result<Self> {
		Self::start(Session::open(config)?)
	}

	pub fn start(session: Session) -> Result<Self> {
		let (sender, commands) = mpsc::channel();
		let handle = thread::Builder::new().name(THREAD_NAME.to_string()).spawn(move || run(session, commands))?;

		Ok(Self {
			inner: Arc::new(Inner {
				sender: Mutex::new(sender),
				handle: Mutex::new(Some(handle)),
			}),
		})
	}

	/// Runs `f` on the worker thread and waits for its result.
	fn call<T, F>(&self, f: F) -> Result<T>
	where
		T: Send + 'static,
		F: FnOnce(&mut Session) -> Result<T> + Send + 'static,
	{
		let (respond_to, response) = mpsc::channel();
		let job: Job = Box::new(move |session| {
			let _ = respond_to.send(f(session));
		});

		let sender = self.inner.sender.lock();
		sender.send(Command::Run(job)).map_err(|_| error!(internal_error!("datastore worker is not running")))?;
		response.recv().map_err(|_| error!(internal_error!("datastore worker stopped before responding")))?
	}
}

impl Datastore for DatastoreWorker {
	fn add_csv(&mut self, request: &AddCsv) -> Result<QueryResult> {
		let request = request.clone();
		self.call(move |session| session.add_csv(&request))
	}

	fn add_sqlite(&mut self, path: &Path) -> Result<Vec<QueryResult>> {
		let path = path.to_path_buf();
		self.call(move |session| session.add_sqlite(&path))
	}

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: ExportDelimiter) -> Result<()> {
		let table = table.to_string();
		let path = path.to_path_buf();
		self.call(move |session| session.export_csv(&table, &path, delimiter))
	}

	fn query(&mut self, sql: &str, table: Option<&str>) -> Result<QueryResult> {
		let sql = sql.to_string();
		let table = table.map(str::to_string);
		self.call(move |session| session.query(&sql, table.as_deref()))
	}

	fn sort(&mut self, table: &str, sorts: &[Sort]) -> Result<QueryResult> {
		let table = table.to_string();
		let sorts = sorts.to_vec();
		self.call(move |session| session.sort(&table, &sorts))
	}

	fn copy(&mut self, table: &str, selection: &CopySelection) -> Result<Copied> {
		let table = table.to_string();
		let selection = selection.clone();
		self.call(move |session| session.copy(&table, &selection))
	}

	fn load_more(&mut self, table: &str, offset: usize) -> Result<Vec<Row>> {
		let table = table.to_string();
		self.call(move |session| session.load_more(&table, offset))
	}

	fn drop_table(&mut self, table: &str) -> Result<()> {
		let table = table.to_string();
		self.call(move |session| session.drop_table(&table))
	}

	fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
		let from = from.to_string();
		let to = to.to_string();
		self.call(move |session| session.rename_table(&from, &to))
	}

	fn change_column_type(
		&mut self,
		table: &str,
		column: &str,
		display_type: DisplayType,
		timestamp_format: Option<&str>,
	) -> Result<QueryResult> {
		let table = table.to_string();
		let column = column.to_string();
		let timestamp_format = timestamp_format.map(str::to_string);
		self.call(move |session| {
			session.change_column_type(&table, &column, display_type, timestamp_format.as_deref())
		})
	}

	fn get_all_tables(&mut self) -> Result<Vec<String>> {
		self.call(|session| session.get_all_tables())
	}

	fn reserve_table_name(&mut self, candidate: &str) -> Result<String> {
		let candidate = candidate.to_string();
		self.call(move |session| session.reserve_table_name(&candidate))
	}

	fn load_table(&mut self, table: &str) -> Result<QueryResult> {
		let table = table.to_string();
		self.call(move |session| session.load_table(&table))
	}

	fn import(&mut self, dir: &Path) -> Result<()> {
		let dir: PathBuf = dir.to_path_buf();
		self.call(move |session| session.import(&dir))
	}

	fn export(&mut self, dir: &Path) -> Result<()> {
		let dir: PathBuf = dir.to_path_buf();
		self.call(move |session| session.export(&dir))
	}

	/// Closes the session and stops the thread. Other clones fail from then on.
	#[instrument(name = "store::worker::close", level = "debug", skip_all)]
	fn close(self) -> Result<()> {
		let Some(handle) = self.inner.handle.lock().take() else {
			return Ok(());
		};

		let (respond_to, response) = mpsc::channel();
		self.inner
			.sender
			.lock()
			.send(Command::Shutdown {
				respond_to: Some(respond_to),
			})
			.map_err(|_| error!(internal_error!("datastore worker is not running")))?;

		let result = response.recv().map_err(|_| error!(internal_error!("datastore worker stopped before closing")))?;
		handle.join().map_err(|_| error!(internal_error!("datastore worker panicked")))?;
		result
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_testing::{fixture::write_csv, tempdir::temp_dir};

	use super::*;

	#[test]
	fn test_calls_run_on_the_worker() {
		temp_dir(|dir| {
			let path = write_csv(dir, "numbers.csv", "n\n3\n1\n2\n")?;
			let mut worker = DatastoreWorker::spawn(DatastoreConfig::default())?;

			let result = worker.add_csv(&AddCsv::new(&path))?;
			assert_eq!(result.name, "numbers");

			let result = worker.query("SELECT n FROM numbers WHERE n > 1", None)?;
			assert_eq!(result.count, 2);
			assert_eq!(worker.get_all_tables()?, vec!["numbers", "query_1"]);

			worker.close()
		})
		.expect("test failed");
	}

	#[test]
	fn test_clones_share_the_session() {
		let mut worker = DatastoreWorker::spawn(DatastoreConfig::default()).unwrap();
		let mut other = worker.clone();

		let handle = thread::spawn(move || other.reserve_table_name("shared").unwrap());
		assert_eq!(handle.join().unwrap(), "shared");
		assert_eq!(worker.reserve_table_name("shared").unwrap(), "shared_1");
	}

	#[test]
	fn test_errors_cross_the_thread() {
		let mut worker = DatastoreWorker::spawn(DatastoreConfig::default()).unwrap();
		let err = worker.load_table("missing").unwrap_err();
		assert_eq!(err.code, "CATALOG_001");
	}

	#[test]
	fn test_calls_after_close_fail() {
		let worker = DatastoreWorker::spawn(DatastoreConfig::default()).unwrap();
		let mut other = worker.clone();
		worker.close().unwrap();

		let err = other.get_all_tables().unwrap_err();
		assert_eq!(err.code, "INTERNAL_ERROR");
	}
}
