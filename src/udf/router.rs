/// Handles navigation events emitted by a view.
///
/// Transition mechanics belong to the implementor; all routing happens on
/// the UI context.
pub trait NavigationRouter {
    type NavigationEvent;

    fn route(&mut self, event: Self::NavigationEvent);
}
