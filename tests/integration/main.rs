mod helpers;
mod test_live_updates;
mod test_queue_paging;
