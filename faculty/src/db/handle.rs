use futures_core::{future::BoxFuture, stream::BoxStream};
use sqlx::{Acquire, Database, Describe, Either, Execute, Executor};

/// Where a repository call runs: straight on the pool, inside an open
/// transaction, or on a connection already checked out of the pool.
///
/// Services pick the variant; repositories only see `&mut Handle` and run
/// the same SQL either way.
#[derive(Debug)]
pub enum Handle<'c, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: Executor<'e, Database = DB>,
{
    Pool(sqlx::Pool<DB>),
    Transaction(sqlx::Transaction<'c, DB>),
    Connection(sqlx::pool::PoolConnection<DB>),
}

/// Evaluates `$call` with `$source` bound to whatever the handle wraps.
macro_rules! dispatch {
    ($handle:expr, $source:ident => $call:expr) => {
        match $handle {
            Handle::Pool($source) => $call,
            Handle::Transaction($source) => $call,
            Handle::Connection($source) => $call,
        }
    };
}

impl<'c, DB> Handle<'c, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: Executor<'e, Database = DB>,
{
    /// Opens a transaction, nested as a savepoint when this handle is
    /// already one.
    pub async fn begin(&mut self) -> crate::Result<Handle<'_, DB>> {
        let tx = dispatch!(self, source => source.begin().await)
            .map_err(crate::db::map_err)?;
        Ok(Handle::Transaction(tx))
    }

    /// Commits a transaction handle; any other handle has nothing to flush.
    pub async fn commit(self) -> crate::Result<()> {
        match self {
            Handle::Transaction(tx) => {
                tx.commit().await.map_err(crate::db::map_err)
            }
            Handle::Pool(_) | Handle::Connection(_) => Ok(()),
        }
    }

    pub async fn rollback(self) -> crate::Result<()> {
        match self {
            Handle::Transaction(tx) => {
                tx.rollback().await.map_err(crate::db::map_err)
            }
            Handle::Pool(_) | Handle::Connection(_) => Ok(()),
        }
    }
}

/// Borrowed view of a [`Handle`] that sqlx accepts as an executor.
#[derive(Debug)]
pub struct HandleExecutor<'h, 'c, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: Executor<'e, Database = DB>,
{
    handle: &'h mut Handle<'c, DB>,
}

pub trait AsExecutor {
    type Executor<'h>: Executor<'h>
    where
        Self: 'h;

    fn as_executor<'h>(&'h mut self) -> Self::Executor<'h>;
}

impl<'c, DB> AsExecutor for Handle<'c, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: Executor<'e, Database = DB>,
{
    type Executor<'h>
        = HandleExecutor<'h, 'c, DB>
    where
        'c: 'h;

    fn as_executor<'h>(&'h mut self) -> Self::Executor<'h> {
        HandleExecutor { handle: self }
    }
}

impl<'h, 'c, DB> Executor<'h> for HandleExecutor<'h, 'c, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: Executor<'e, Database = DB>,
{
    type Database = DB;

    fn fetch_many<'e, 'q: 'e, E>(
        self,
        query: E,
    ) -> BoxStream<'e, Result<Either<DB::QueryResult, DB::Row>, sqlx::Error>>
    where
        'c: 'e,
        'h: 'e,
        E: 'q + Execute<'q, DB>,
    {
        dispatch!(self.handle, source => source.fetch_many(query))
    }

    fn fetch_optional<'e, 'q: 'e, E>(
        self,
        query: E,
    ) -> BoxFuture<'e, Result<Option<DB::Row>, sqlx::Error>>
    where
        'c: 'e,
        'h: 'e,
        E: 'q + Execute<'q, DB>,
    {
        dispatch!(self.handle, source => source.fetch_optional(query))
    }

    fn prepare_with<'e, 'q: 'e>(
        self,
        sql: &'q str,
        parameters: &'e [DB::TypeInfo],
    ) -> BoxFuture<'e, Result<DB::Statement<'q>, sqlx::Error>>
    where
        'c: 'e,
        'h: 'e,
    {
        dispatch!(self.handle, source => source.prepare_with(sql, parameters))
    }

    fn describe<'e, 'q: 'e>(
        self,
        sql: &'q str,
    ) -> BoxFuture<'e, Result<Describe<DB>, sqlx::Error>>
    where
        'c: 'e,
        'h: 'e,
    {
        dispatch!(self.handle, source => source.describe(sql))
    }
}
